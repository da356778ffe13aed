use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct Keymap {
    pub quit: String,
    pub select_up: String,
    pub select_down: String,
    pub expand: String,
    pub collapse: String,
    pub activate: String,
    pub add_tag: String,
    pub remove_tag: String,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct Config {
    pub keymap: Keymap,
    /// Tag attached/detached by the demo keybindings
    pub demo_tag: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            keymap: Keymap {
                quit: "q".to_string(),
                select_up: "up".to_string(),
                select_down: "down".to_string(),
                expand: "right".to_string(),
                collapse: "left".to_string(),
                activate: "enter".to_string(),
                add_tag: "t".to_string(),
                remove_tag: "u".to_string(),
            },
            demo_tag: "starred".to_string(),
        }
    }
}

pub fn load_config(path: &PathBuf) -> Config {
    if !path.exists() {
        let config = Config::default();
        let toml = toml::to_string(&config).unwrap();
        fs::write(path, toml).expect("Failed to write default config");
        return config;
    }

    let content = fs::read_to_string(path).expect("Failed to read config file");
    toml::from_str(&content).expect("Failed to parse config file")
}
