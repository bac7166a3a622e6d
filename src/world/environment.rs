use serde::Deserialize;

/// Dimension type of a world.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[default]
    Normal,
    Nether,
    End,
}

impl Environment {
    pub fn key(self) -> &'static str {
        match self {
            Environment::Normal => "minecraft:overworld",
            Environment::Nether => "minecraft:the_nether",
            Environment::End => "minecraft:the_end",
        }
    }

    /// Position in the vanilla `minecraft:dimension_type` registry
    /// (overworld, overworld_caves, the_end, the_nether).
    pub fn dimension_type_index(self) -> i32 {
        match self {
            Environment::Normal => 0,
            Environment::End => 2,
            Environment::Nether => 3,
        }
    }

    pub fn has_sky_light(self) -> bool {
        matches!(self, Environment::Normal)
    }

    pub fn min_y(self) -> i32 {
        match self {
            Environment::Normal => -64,
            Environment::Nether | Environment::End => 0,
        }
    }

    pub fn height(self) -> i32 {
        match self {
            Environment::Normal => 384,
            Environment::Nether | Environment::End => 256,
        }
    }

    pub fn section_count(self) -> usize {
        (self.height() / 16) as usize
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_section_counts() {
        assert_eq!(Environment::Normal.section_count(), 24);
        assert_eq!(Environment::Nether.section_count(), 16);
        assert_eq!(Environment::End.section_count(), 16);
    }

    #[test]
    fn test_only_overworld_has_sky_light() {
        assert!(Environment::Normal.has_sky_light());
        assert!(!Environment::Nether.has_sky_light());
        assert!(!Environment::End.has_sky_light());
    }

    #[test]
    fn test_deserialize_lowercase() {
        let env: Environment = serde_json::from_str("\"nether\"").unwrap();
        assert_eq!(env, Environment::Nether);
        assert_eq!(env.key(), "minecraft:the_nether");
    }
}
