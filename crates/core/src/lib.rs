pub mod classifier;
pub mod config;
pub mod dead_letter;
pub mod metrics;
pub mod notifier;
pub mod processor;
pub mod reconcile;
pub mod summarizer;
pub mod testing;
pub mod ticket;

pub use classifier::{Classification, Classifier, ClassifyError, RuleClassifier};
pub use config::{
    load_config, load_config_from_env, load_config_from_str, validate_config, Config, ConfigError,
    LogFormat, SanitizedConfig,
};
pub use dead_letter::{
    DeadLetterEntry, DeadLetterError, DeadLetterRecord, DeadLetterSink, DeadLetterStage,
    FsDeadLetterSink,
};
pub use metrics::{MetricsSnapshot, PipelineCounters, PipelineMetrics};
pub use notifier::{format_p1_alert, Delivery, Notifier, NotifierConfig, NotifyError, TelegramNotifier};
pub use processor::{
    BatchProcessor, BatchSummary, ProcessError, ProcessedTicket, ProcessorConfig, TicketProcessor,
};
pub use reconcile::{JobError, JobReport, JsonDataset, JsonTicketSource, ReconcileJob, TicketSource};
pub use summarizer::{Summarizer, SummarizerConfig};
pub use ticket::{
    ClassifiedTicket, OutcomeStatus, Priority, ProcessingOutcome, Sentiment, Ticket,
    TicketPayload, TicketRecord, Topic,
};
