//! Test configuration fixtures

use curator_shared_config::{CommonConfig, OllamaConfig, PlexConfig};
use curator_worker::Config;

pub const COLLECTION_TITLE: &str = "Recommended For You";

/// Configuration with history 10, 5 recommendations and minimum 2
pub fn test_config(libraries: &[&str]) -> Config {
    Config {
        common: CommonConfig {
            plex: PlexConfig::new("http://plex.test:32400", "test-token"),
            ollama: OllamaConfig::default(),
        },
        library_names: libraries.iter().map(|l| l.to_string()).collect(),
        collection_title: COLLECTION_TITLE.to_string(),
        history_amount: 10,
        recommended_amount: 5,
        minimum_amount: 2,
        wait_seconds: 86_400,
    }
}

/// Ten distinct watched titles
pub const WATCHED: [&str; 10] = [
    "Heat",
    "Ronin",
    "Thief",
    "Collateral",
    "The Town",
    "Drive",
    "Sicario",
    "Prisoners",
    "Zodiac",
    "Se7en",
];
