//! CRF Learner (spec §4.3): a linear-chain conditional random field trained
//! with L-BFGS, BIO-labeled implicitly from user corrections rather than
//! annotated spans.

pub mod eval;
pub mod infer;
pub mod labeling;
pub mod model;
pub mod optim;
pub mod train;

pub use eval::{train_and_evaluate, TrainMetrics};
pub use labeling::label_sequence;
pub use model::CrfModel;
pub use train::{CrfTrainer, TrainingSequence};
