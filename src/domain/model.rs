use std::path::Path;

/// Model used when neither the command line nor the config names one.
pub const DEFAULT_MODEL: &str = "tiny.en";

/// Language passed to the engine for a given model.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LanguageHint {
    /// English-only model variant; the language is fixed.
    English,
    /// Multilingual model; the engine detects the language.
    Auto,
}

impl LanguageHint {
    /// Derive the hint from a model name or a path to its ggml file.
    /// English-only variants end in `.en` (`ggml-base.en.bin` included).
    pub fn for_model(name: &str) -> Self {
        let stem = Path::new(name)
            .file_name()
            .and_then(|f| f.to_str())
            .unwrap_or(name);
        let stem = stem.strip_prefix("ggml-").unwrap_or(stem);
        let stem = stem.strip_suffix(".bin").unwrap_or(stem);

        if stem.ends_with(".en") {
            LanguageHint::English
        } else {
            LanguageHint::Auto
        }
    }

    /// Language code understood by whisper.cpp.
    pub fn code(&self) -> &'static str {
        match self {
            LanguageHint::English => "en",
            LanguageHint::Auto => "auto",
        }
    }
}

impl std::fmt::Display for LanguageHint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// A known whisper.cpp model.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModelInfo {
    /// Identifier used on the wire (e.g. "tiny.en").
    pub name: &'static str,
    /// Approximate download size in MB.
    pub size_mb: u32,
    pub description: &'static str,
}

impl ModelInfo {
    /// Name of the ggml file for this model.
    pub fn file_name(&self) -> String {
        model_file_name(self.name)
    }

    /// Download URL below `base_url`.
    pub fn download_url(&self, base_url: &str) -> String {
        format!("{}/{}", base_url.trim_end_matches('/'), self.file_name())
    }

    pub fn language(&self) -> LanguageHint {
        LanguageHint::for_model(self.name)
    }
}

/// Models that can be fetched by name.
pub const CATALOG: &[ModelInfo] = &[
    ModelInfo { name: "tiny", size_mb: 75, description: "Tiny - fastest, basic accuracy" },
    ModelInfo { name: "tiny.en", size_mb: 75, description: "Tiny (English) - fastest, basic accuracy" },
    ModelInfo { name: "base", size_mb: 142, description: "Base - fast, good accuracy" },
    ModelInfo { name: "base.en", size_mb: 142, description: "Base (English) - fast, good accuracy" },
    ModelInfo { name: "small", size_mb: 466, description: "Small - medium speed, better accuracy" },
    ModelInfo { name: "small.en", size_mb: 466, description: "Small (English) - medium speed, better accuracy" },
    ModelInfo { name: "medium", size_mb: 1500, description: "Medium - slow, high accuracy" },
    ModelInfo { name: "medium.en", size_mb: 1500, description: "Medium (English) - slow, high accuracy" },
    ModelInfo { name: "large-v1", size_mb: 2900, description: "Large v1" },
    ModelInfo { name: "large-v2", size_mb: 2900, description: "Large v2" },
    ModelInfo { name: "large-v3", size_mb: 2900, description: "Large v3 - slowest, best accuracy" },
    ModelInfo { name: "large-v3-turbo", size_mb: 1600, description: "Large v3 turbo" },
];

/// Look a model up in the catalog.
pub fn find_model(name: &str) -> Option<&'static ModelInfo> {
    CATALOG.iter().find(|m| m.name == name)
}

/// ggml file name for a model name, catalogued or not.
pub fn model_file_name(name: &str) -> String {
    format!("ggml-{}.bin", name)
}
