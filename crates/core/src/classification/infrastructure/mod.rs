pub mod label_map;
pub mod onnx_accent_classifier;
