/// Stages of one quicksolver session, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunStage {
    Opening,
    Authenticating,
    SelectingPrimaryFields,
    CheckingCache,
    ScrapingForm,
    SavingFields,
    UploadingFields,
    Running,
    Collecting,
    Completed,
}

impl RunStage {
    pub fn label(&self) -> &'static str {
        match self {
            RunStage::Opening => "opening",
            RunStage::Authenticating => "authenticating",
            RunStage::SelectingPrimaryFields => "selecting",
            RunStage::CheckingCache => "cache",
            RunStage::ScrapingForm => "scraping",
            RunStage::SavingFields => "saving-fields",
            RunStage::UploadingFields => "uploading",
            RunStage::Running => "running",
            RunStage::Collecting => "collecting",
            RunStage::Completed => "completed",
        }
    }
}

#[derive(Debug, Clone)]
pub struct RunProgressEvent {
    pub stage: RunStage,
    pub elapsed_wall_s: f64,
    pub message: Option<String>,
}

impl RunProgressEvent {
    pub fn stage(stage: RunStage, elapsed_wall_s: f64, message: Option<String>) -> Self {
        Self {
            stage,
            elapsed_wall_s,
            message,
        }
    }
}
