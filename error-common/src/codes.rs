// Error codes implementation
// Standardized error codes for the symptom inference engine

pub mod configuration {
    pub const INVALID_CONFIG: &str = "CONFIG_1001";
    pub const ARTIFACT_UNREADABLE: &str = "CONFIG_1002";
    pub const VOCABULARY_MISMATCH: &str = "CONFIG_1003";
}

pub mod data {
    pub const MALFORMED_TABLE: &str = "DATA_2001";
    pub const KNOWLEDGE_BASE: &str = "DATA_2002";
}

pub mod training {
    pub const FIT_FAILED: &str = "TRAIN_3001";
}

pub mod validation {
    pub const INVALID_INPUT: &str = "VALIDATION_4001";
}

pub mod system {
    pub const IO: &str = "SYS_5001";
    pub const SERIALIZATION: &str = "SYS_5002";
    pub const INTERNAL: &str = "SYS_5999";
}
