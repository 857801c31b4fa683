#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Unknown operating state code {0}")]
    UnknownState(u8),
    #[error("Scenario step {step}: expected {expected} {what}, got {actual}")]
    ScenarioShape {
        step: usize,
        what: &'static str,
        expected: usize,
        actual: usize,
    },
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[cfg(feature = "simulation")]
    #[error("Invalid scenario file: {0}")]
    Yaml(#[from] serde_yaml::Error),
}
