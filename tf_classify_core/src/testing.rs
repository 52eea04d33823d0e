//! Fixture model, image, label and config files in a temporary directory.
#![allow(dead_code)]

use std::path::{Path, PathBuf};

use image::{Rgb, RgbImage};
use tract_tensorflow::prelude::*;
use tract_tensorflow::tfpb;
use tract_tensorflow::tfpb::tensorflow::{attr_value, AttrValue, DataType, NodeDef, TensorProto};

/// Side of the square input the fixture graph expects.
pub const IMAGE_SIZE: usize = 4;

pub const FLOWERS: &str = "daisy\ndandelion\ncat\nroses\nsunflowers\ntulips\n";
pub const FLOWER_SCORES: [f32; 6] = [0.1, 0.05, 0.6, 0.2, 0.04, 0.01];

fn konst(name: &str, tensor: Tensor, dtype: DataType) -> NodeDef {
    let value = TensorProto::try_from(&tensor).unwrap();
    tfpb::node().name(name).op("Const").attr("dtype", dtype).attr("value", value)
}

fn flag(b: bool) -> AttrValue {
    AttrValue { value: Some(attr_value::Value::B(b)) }
}

/// Writes a frozen graph whose `final_result` equals `scores` for any image.
///
/// Mul (placeholder) -> Reshape -> MatMul(zero weights) -> Add(scores)
pub fn write_graph(path: &Path, scores: &[f32]) {
    let features = IMAGE_SIZE * IMAGE_SIZE * 3;
    let shape = tensor1(&[1i32, features as i32]);
    let weights = Tensor::zero::<f32>(&[features, scores.len()]).unwrap();
    let graph = tfpb::graph()
        .node(tfpb::node().name("Mul").op("Placeholder").attr("dtype", DataType::DtFloat))
        .node(konst("flatten/shape", shape, DataType::DtInt32))
        .node(
            tfpb::node()
                .name("flatten")
                .op("Reshape")
                .attr("T", DataType::DtFloat)
                .attr("Tshape", DataType::DtInt32)
                .input("Mul")
                .input("flatten/shape"),
        )
        .node(konst("weights", weights, DataType::DtFloat))
        .node(
            tfpb::node()
                .name("logits")
                .op("MatMul")
                .attr("T", DataType::DtFloat)
                .attr("transpose_a", flag(false))
                .attr("transpose_b", flag(false))
                .input("flatten")
                .input("weights"),
        )
        .node(konst("bias", tensor1(scores), DataType::DtFloat))
        .node(
            tfpb::node()
                .name("final_result")
                .op("Add")
                .attr("T", DataType::DtFloat)
                .input("logits")
                .input("bias"),
        );
    std::fs::write(path, graph.write_to_bytes().unwrap()).unwrap();
}

pub fn write_image(path: &Path) {
    RgbImage::from_fn(16, 12, |x, y| Rgb([(x * 16) as u8, (y * 20) as u8, 200]))
        .save_with_format(path, image::ImageFormat::Png)
        .unwrap();
}

/// Config pointing the classifier at the fixture graph's input size.
pub const CONFIG: &str = "image_size = 4\n";

pub struct Fixture {
    pub dir: tempfile::TempDir,
    pub image: PathBuf,
    pub model: PathBuf,
    pub labels: PathBuf,
    pub config: PathBuf,
}

impl Fixture {
    pub fn new(scores: &[f32], labels: &str) -> Self {
        let dir = tempfile::tempdir().unwrap();
        let image = dir.path().join("photo.png");
        let model = dir.path().join("output_graph.pb");
        let labels_path = dir.path().join("output_labels.txt");
        let config = dir.path().join("model.toml");
        write_image(&image);
        write_graph(&model, scores);
        std::fs::write(&labels_path, labels).unwrap();
        std::fs::write(&config, CONFIG).unwrap();
        Fixture {
            dir,
            image,
            model,
            labels: labels_path,
            config,
        }
    }

    pub fn flowers() -> Self {
        Self::new(&FLOWER_SCORES, FLOWERS)
    }
}
