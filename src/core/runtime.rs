/// The immutable runtime a game session runs against: scripts, definitions,
/// hooks and configuration. Built via `Runtime::builder()`.

use log::info;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::core::builtins::register_builtins;
use crate::core::catalog::{Catalog, CatalogError, TickHooks};
use crate::core::config::{ConfigError, EngineConfig};
use crate::core::registry::{RegistryError, ScriptRegistry};
use crate::core::story::{StoryBook, StoryError};
use crate::schema::entity::Player;

#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error("registry error: {0}")]
    Registry(#[from] RegistryError),
    #[error("story error: {0}")]
    Story(#[from] StoryError),
    #[error("config error: {0}")]
    Config(#[from] ConfigError),
    #[error("catalog error: {0}")]
    Catalog(#[from] CatalogError),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub struct Runtime {
    pub scripts: ScriptRegistry,
    pub catalog: Catalog,
    pub hooks: TickHooks,
    pub config: EngineConfig,
    /// Template for the player of every new session.
    pub player: Player,
    pub story: StoryBook,
}

/// Builder for constructing a `Runtime`.
#[derive(Default)]
pub struct RuntimeBuilder {
    config: Option<EngineConfig>,
    config_path: Option<PathBuf>,
    story_dirs: Vec<PathBuf>,
    world_files: Vec<PathBuf>,
    /// Directly provided pieces (for games and tests without files).
    scripts: Option<ScriptRegistry>,
    catalog: Option<Catalog>,
    hooks: Option<TickHooks>,
    story: Option<StoryBook>,
    player: Option<Player>,
}

impl Runtime {
    pub fn builder() -> RuntimeBuilder {
        RuntimeBuilder::default()
    }
}

impl RuntimeBuilder {
    pub fn config(mut self, config: EngineConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Load the config from a RON file at build time. Takes precedence over
    /// [`config`](Self::config).
    pub fn config_file(mut self, path: impl AsRef<Path>) -> Self {
        self.config_path = Some(path.as_ref().to_path_buf());
        self
    }

    /// Start from a registry already holding the game's own scripts.
    pub fn with_scripts(mut self, scripts: ScriptRegistry) -> Self {
        self.scripts = Some(scripts);
        self
    }

    pub fn with_catalog(mut self, catalog: Catalog) -> Self {
        self.catalog = Some(catalog);
        self
    }

    pub fn with_hooks(mut self, hooks: TickHooks) -> Self {
        self.hooks = Some(hooks);
        self
    }

    pub fn with_story(mut self, story: StoryBook) -> Self {
        self.story = Some(story);
        self
    }

    /// Load every `.ron` file in `path` as a story book. Books loaded here
    /// override passages given through [`with_story`](Self::with_story).
    pub fn story_dir(mut self, path: impl AsRef<Path>) -> Self {
        self.story_dirs.push(path.as_ref().to_path_buf());
        self
    }

    /// Add the definitions of a RON world file to the catalog.
    pub fn world_file(mut self, path: impl AsRef<Path>) -> Self {
        self.world_files.push(path.as_ref().to_path_buf());
        self
    }

    pub fn player(mut self, player: Player) -> Self {
        self.player = Some(player);
        self
    }

    pub fn build(self) -> Result<Runtime, RuntimeError> {
        let config = match &self.config_path {
            Some(path) => EngineConfig::load_from_ron(path)?,
            None => {
                let config = self.config.unwrap_or_default();
                config.validate()?;
                config
            }
        };

        let mut story = self.story.unwrap_or_default();
        for dir in &self.story_dirs {
            load_ron_files_from_dir(dir, |path| {
                story.merge(StoryBook::load_from_ron(path)?);
                Ok(())
            })?;
        }

        let mut catalog = self.catalog.unwrap_or_default();
        for path in &self.world_files {
            let contents = std::fs::read_to_string(path)?;
            catalog.add_ron(&contents)?;
        }

        let mut scripts = self.scripts.unwrap_or_default();
        let custom = scripts.len();
        register_builtins(&mut scripts)?;
        story.register(&mut scripts)?;
        info!(
            "runtime ready: {} scripts ({} custom, {} passages)",
            scripts.len(),
            custom,
            story.len()
        );

        Ok(Runtime {
            scripts,
            catalog,
            hooks: self.hooks.unwrap_or_default(),
            config,
            player: self.player.unwrap_or_default(),
            story,
        })
    }
}

/// Load all .ron files from a directory in name order, calling `loader`
/// for each.
fn load_ron_files_from_dir<F>(dir: &Path, mut loader: F) -> Result<(), RuntimeError>
where
    F: FnMut(&Path) -> Result<(), RuntimeError>,
{
    let mut paths = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let path = entry?.path();
        if path.extension().and_then(|s| s.to_str()) == Some("ron") {
            paths.push(path);
        }
    }
    paths.sort();
    for path in &paths {
        loader(path)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::builtins::BUILTIN_NAMES;
    use crate::core::resolver::Output;

    #[test]
    fn default_runtime_has_builtins() {
        let runtime = Runtime::builder().build().unwrap();
        assert_eq!(runtime.scripts.len(), BUILTIN_NAMES.len());
        assert_eq!(runtime.config, EngineConfig::default());
        assert_eq!(runtime.player.name, "You");
    }

    #[test]
    fn custom_script_colliding_with_builtin_fails() {
        let mut scripts = ScriptRegistry::new();
        scripts.register("text", |_, _| Ok(Output::Unit)).unwrap();
        let result = Runtime::builder().with_scripts(scripts).build();
        assert!(matches!(
            result,
            Err(RuntimeError::Registry(RegistryError::DuplicateName(name))) if name == "text"
        ));
    }

    #[test]
    fn passage_colliding_with_builtin_fails() {
        let story = StoryBook::parse_ron(r#"{ "wait": Passage(text: ["..."]) }"#).unwrap();
        assert!(Runtime::builder().with_story(story).build().is_err());
    }

    #[test]
    fn invalid_config_rejected() {
        let config = EngineConfig {
            wait_chunk_minutes: 0,
            ..EngineConfig::default()
        };
        assert!(matches!(
            Runtime::builder().config(config).build(),
            Err(RuntimeError::Config(_))
        ));
    }

    #[test]
    fn config_file_and_story_dir() {
        let runtime = Runtime::builder()
            .config_file("tests/fixtures/engine.ron")
            .story_dir("tests/fixtures/stories")
            .build()
            .unwrap();
        assert_eq!(runtime.config.epoch_weekday, 0);
        assert!(runtime.catalog.location("tavern").is_none());
        assert!(runtime.scripts.contains("tavern_door"));
        assert!(runtime.story.passage("tavern_door").is_some());
    }

    #[test]
    fn world_file_extends_given_catalog() {
        let mut catalog = Catalog::new();
        catalog
            .add_location(crate::core::catalog::LocationDef::new("cellar", "Cellar"))
            .unwrap();
        let runtime = Runtime::builder()
            .with_catalog(catalog)
            .world_file("tests/fixtures/world.ron")
            .build()
            .unwrap();
        assert!(runtime.catalog.location("cellar").is_some());
        assert!(runtime.catalog.actor("mara").is_some());
    }

    #[test]
    fn missing_story_dir_is_io_error() {
        let result = Runtime::builder().story_dir("tests/fixtures/no_such_dir").build();
        assert!(matches!(result, Err(RuntimeError::Io(_))));
    }
}
