pub mod config;
pub mod graph;
pub mod labels;
pub mod preprocess;
pub mod ranking;
#[cfg(feature = "testing")]
pub mod testing;

use std::fmt;
use std::path::Path;

use anyhow::Result;
use tracing::{debug, info};

pub use config::ModelConfig;
pub use graph::FrozenGraph;
pub use labels::Labels;

/// One ranked class, printed as `label,score` with five decimals.
#[derive(Debug, Clone, PartialEq)]
pub struct Classification {
    pub label: String,
    pub score: f32,
}

impl fmt::Display for Classification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{:.5}", self.label, self.score)
    }
}

pub struct ImageClassifier {
    config: ModelConfig,
    labels: Labels,
    graph: FrozenGraph,
}

impl ImageClassifier {
    pub fn new<M, L>(model_path: M, labels_path: L, config: ModelConfig) -> Result<Self>
    where
        M: AsRef<Path>,
        L: AsRef<Path>,
    {
        config.validate()?;
        let labels = Labels::from_path(labels_path)?;
        info!("loaded {} labels", labels.len());
        let graph = FrozenGraph::load(model_path, &config)?;
        Ok(ImageClassifier {
            config,
            labels,
            graph,
        })
    }

    pub fn classify<T: AsRef<Path>>(&self, image_path: T) -> Result<Vec<Classification>> {
        let image = preprocess::load_image(image_path, &self.config)?;
        let scores = self.graph.predict(&image)?;
        debug!("scores: {:?}", scores);
        rank_labels(&scores, &self.labels, self.config.top_k)
    }
}

/// Resolves the `k` best scores to their labels.
pub fn rank_labels(scores: &[f32], labels: &Labels, k: usize) -> Result<Vec<Classification>> {
    ranking::top_k(scores, k)
        .into_iter()
        .map(|p| {
            Ok(Classification {
                label: labels.get(p.class)?.to_string(),
                score: p.score,
            })
        })
        .collect()
}

/// Loads everything, runs the graph once on `image` and ranks the result.
pub fn classify<I, M, L>(
    image: I,
    model: M,
    labels: L,
    config: &ModelConfig,
) -> Result<Vec<Classification>>
where
    I: AsRef<Path>,
    M: AsRef<Path>,
    L: AsRef<Path>,
{
    ImageClassifier::new(model, labels, config.clone())?.classify(image)
}
