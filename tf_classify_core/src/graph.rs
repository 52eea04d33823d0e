use std::path::Path;

use anyhow::{bail, Context, Result};
use tracing::{debug, info};
use tract_tensorflow::prelude::*;

use crate::config::{node_name, ModelConfig};
use crate::preprocess::InputImage;

/// A frozen TensorFlow GraphDef, cut between the configured input and output
/// nodes and optimised for one image at a time.
#[allow(clippy::type_complexity)]
pub struct FrozenGraph {
    plan: SimplePlan<TypedFact, Box<dyn TypedOp>, Graph<TypedFact, Box<dyn TypedOp>>>,
}

impl FrozenGraph {
    pub fn load<P: AsRef<Path>>(path: P, config: &ModelConfig) -> Result<Self> {
        let path = path.as_ref();
        let start = std::time::Instant::now();
        let mut model = tract_tensorflow::tensorflow()
            .model_for_path(path)
            .with_context(|| format!("failed to load graph {}", path.display()))?;
        debug!("graph has {} nodes", model.nodes().len());

        let input = node_name(&config.input_name);
        let output = node_name(&config.output_name);
        model
            .set_input_names([input])
            .with_context(|| format!("input tensor {} not found", config.input_name))?;
        model
            .set_output_names([output])
            .with_context(|| format!("output tensor {} not found", config.output_name))?;

        let size = config.image_size;
        let plan = model
            .with_input_fact(0, f32::fact([1, size, size, 3]).into())?
            .into_optimized()
            .with_context(|| format!("failed to optimize graph {}", path.display()))?
            .into_runnable()?;
        info!("loaded {} in {:?}", path.display(), start.elapsed());
        Ok(FrozenGraph { plan })
    }

    /// Runs the graph once and returns the score row of the first image.
    pub fn predict(&self, image: &InputImage) -> Result<Vec<f32>> {
        let input = Tensor::from_shape(image.dims(), &image.to_vec()?)?;

        let start = std::time::Instant::now();
        let outputs = self.plan.run(tvec!(input.into()))?;
        info!("forward costs:{:?}", start.elapsed());

        let scores = outputs[0].to_array_view::<f32>()?;
        let scores: Vec<f32> = match scores.ndim() {
            0 => bail!("output tensor is a scalar, expected one score per class"),
            1 => scores.iter().copied().collect(),
            _ => scores.index_axis(tract_ndarray::Axis(0), 0).iter().copied().collect(),
        };
        Ok(scores)
    }
}
