use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde::Deserialize;

/// Subset of a Hugging Face `config.json` carrying the class names.
#[derive(Deserialize)]
struct HfConfig {
    id2label: BTreeMap<String, String>,
}

/// Load class labels in model output order.
///
/// Accepts either a Hugging Face `config.json` (reads `id2label`, ordered by
/// numeric id) or a plain text file with one label per line.
pub fn load_labels(path: &Path) -> Result<Vec<String>, Box<dyn std::error::Error>> {
    let text = fs::read_to_string(path)
        .map_err(|e| format!("Failed to read labels from {}: {e}", path.display()))?;

    let is_json = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));

    let labels = if is_json {
        parse_hf_config(&text)?
    } else {
        text.lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(String::from)
            .collect()
    };

    if labels.is_empty() {
        return Err(format!("No labels found in {}", path.display()).into());
    }
    Ok(labels)
}

fn parse_hf_config(text: &str) -> Result<Vec<String>, Box<dyn std::error::Error>> {
    let config: HfConfig = serde_json::from_str(text)?;

    let mut indexed = config
        .id2label
        .into_iter()
        .map(|(id, label)| {
            id.parse::<usize>()
                .map(|idx| (idx, label))
                .map_err(|_| format!("Non-numeric label id: {id}"))
        })
        .collect::<Result<Vec<_>, _>>()?;
    indexed.sort_by_key(|(idx, _)| *idx);

    for (expected, (idx, _)) in indexed.iter().enumerate() {
        if *idx != expected {
            return Err(format!("Label ids are not contiguous: missing id {expected}").into());
        }
    }

    Ok(indexed.into_iter().map(|(_, label)| label).collect())
}
