use crate::error::{LimboError, Result};
use once_cell::sync::OnceCell;
use serde::Deserialize;
use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::Path;

/// Block-state report shipped with the server, in the format of the vanilla
/// data generator's `reports/blocks.json`.
const BUNDLED_BLOCKS: &str = include_str!("../../data/blocks.json");

/// Bits per entry the client expects for a direct (global) block palette.
pub const DIRECT_BLOCK_BITS: u32 = 15;

static GLOBAL_PALETTE: OnceCell<GlobalPalette> = OnceCell::new();

/// A semantic block state: a namespaced block name plus optional properties.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BlockState {
    pub name: String,
    pub properties: Option<BTreeMap<String, String>>,
}

impl BlockState {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            properties: None,
        }
    }

    pub fn air() -> Self {
        Self::new("minecraft:air")
    }

    pub fn with_property(mut self, key: &str, value: &str) -> Self {
        self.properties
            .get_or_insert_with(BTreeMap::new)
            .insert(key.to_string(), value.to_string());
        self
    }

    pub fn is_air(&self) -> bool {
        matches!(
            self.name.as_str(),
            "minecraft:air" | "minecraft:cave_air" | "minecraft:void_air"
        )
    }
}

#[derive(Debug, Deserialize)]
struct BlockReport {
    #[serde(default)]
    properties: Option<BTreeMap<String, Vec<String>>>,
    states: Vec<StateReport>,
}

#[derive(Debug, Deserialize)]
struct StateReport {
    id: i32,
    #[serde(default)]
    default: bool,
    #[serde(default)]
    properties: BTreeMap<String, String>,
}

#[derive(Debug)]
struct BlockVariants {
    /// Ordered as in the dataset.
    states: Vec<(BTreeMap<String, String>, i32)>,
    has_properties: bool,
    default_id: Option<i32>,
}

/// Block state to protocol ID table. Loaded once, never mutated afterwards.
#[derive(Debug)]
pub struct GlobalPalette {
    blocks: HashMap<String, BlockVariants>,
}

impl GlobalPalette {
    pub fn from_json(json: &str) -> Result<Self> {
        let report: HashMap<String, BlockReport> = serde_json::from_str(json)
            .map_err(|err| LimboError::PaletteError(format!("Malformed block report: {}", err)))?;

        let mut blocks = HashMap::with_capacity(report.len());
        for (name, block) in report {
            if block.states.is_empty() {
                return Err(LimboError::PaletteError(format!(
                    "Block {} has no states",
                    name
                )));
            }
            let default_id = block
                .states
                .iter()
                .find(|state| state.default)
                .map(|state| state.id);
            let states = block
                .states
                .into_iter()
                .map(|state| (state.properties, state.id))
                .collect();
            blocks.insert(
                name,
                BlockVariants {
                    states,
                    has_properties: block.properties.is_some(),
                    default_id,
                },
            );
        }

        Ok(Self { blocks })
    }

    /// The dataset compiled into the binary.
    pub fn bundled() -> Result<Self> {
        Self::from_json(BUNDLED_BLOCKS)
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let json = fs::read_to_string(path).map_err(|err| {
            LimboError::PaletteError(format!("Failed to read {}: {}", path.display(), err))
        })?;
        Self::from_json(&json)
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    /// Resolves a block name and optional properties to its protocol ID.
    ///
    /// Blocks without properties resolve to their only state. Otherwise the
    /// first state (in dataset order) whose declared properties all equal the
    /// supplied values wins; supplied keys the state does not declare are
    /// ignored. With no match, or no properties given, the default state is
    /// used. Unknown blocks and blocks without a default resolve to 0 (air)
    /// so one bad block never fails a whole chunk.
    pub fn resolve(&self, name: &str, properties: Option<&BTreeMap<String, String>>) -> i32 {
        let Some(block) = self.blocks.get(name) else {
            return 0;
        };

        if !block.has_properties {
            return block.states.first().map(|(_, id)| *id).unwrap_or(0);
        }

        if let Some(supplied) = properties {
            let matched = block.states.iter().find(|(declared, _)| {
                declared
                    .iter()
                    .all(|(key, value)| supplied.get(key) == Some(value))
            });
            if let Some((_, id)) = matched {
                return *id;
            }
        }

        block.default_id.unwrap_or(0)
    }

    pub fn resolve_state(&self, state: &BlockState) -> i32 {
        self.resolve(&state.name, state.properties.as_ref())
    }
}

/// Installs the process-wide palette. Must run before any connection is
/// served; a second call is an error.
pub fn init_global_palette(palette: GlobalPalette) -> Result<&'static GlobalPalette> {
    GLOBAL_PALETTE
        .set(palette)
        .map_err(|_| LimboError::PaletteError("Global palette already initialized".to_string()))?;
    global_palette()
}

/// Installs the bundled dataset unless a palette is already present.
pub fn load_bundled_global_palette() -> Result<&'static GlobalPalette> {
    GLOBAL_PALETTE.get_or_try_init(GlobalPalette::bundled)
}

pub fn global_palette() -> Result<&'static GlobalPalette> {
    GLOBAL_PALETTE
        .get()
        .ok_or_else(|| LimboError::PaletteError("Global palette not initialized".to_string()))
}
