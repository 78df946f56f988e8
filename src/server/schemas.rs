use schemars::JsonSchema;
use serde::Deserialize;

#[derive(Debug, Deserialize, JsonSchema)]
pub struct ScanProjectRequest {
    #[schemars(description = "Project root directory to scan")]
    pub project_path: String,

    #[schemars(description = "Include test directories and test files (default: false)")]
    pub include_tests: Option<bool>,

    #[schemars(
        description = "Keep prior completion state across this re-scan (default: project config, which defaults to true)"
    )]
    pub preserve_completed: Option<bool>,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct AnalyzeFileRequest {
    #[schemars(description = "Path of the file being analyzed (used for language detection)")]
    pub file_path: String,

    #[schemars(description = "Full file content to classify")]
    pub file_content: String,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct RecordCompletionRequest {
    #[schemars(description = "Project root directory")]
    pub project_path: String,

    #[schemars(description = "Project-relative paths of files transformed in this session")]
    pub completed_files: Vec<String>,

    #[schemars(description = "Free-form note stored with this update")]
    pub notes: Option<String>,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct ProgressStatisticsRequest {
    #[schemars(description = "Project root directory")]
    pub project_path: String,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct ResetProgressRequest {
    #[schemars(description = "Project root directory")]
    pub project_path: String,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct InjectRulesRequest {
    #[schemars(description = "Target project root (used to generate project-specific rules)")]
    pub project_path: String,

    #[schemars(description = "Editor workspace root receiving the .cursor/rules documents")]
    pub editor_root: String,

    #[schemars(description = "Optional application theme woven into the generated rules")]
    pub app_theme: Option<String>,
}
