pub mod gemini_evaluator;
