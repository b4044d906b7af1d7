/// Parsers for the two accepted embeddings response shapes
///
/// - OpenAI style: `{"data": [{"embedding": [..], "index": 0}, ...]}`
/// - Bare style:   `{"embeddings": [[..], ...]}`
///
/// Each parser is tried in turn; the first that matches wins.
use super::EmbeddingError;
use serde::Deserialize;
use serde_json::Value;

/// Vectors extracted from a response, tagged by the shape they came from
#[derive(Debug, Clone, PartialEq)]
pub enum EmbeddingsPayload {
    Data(Vec<Vec<f32>>),
    Bare(Vec<Vec<f32>>),
}

impl EmbeddingsPayload {
    pub fn len(&self) -> usize {
        self.vectors().len()
    }

    pub fn is_empty(&self) -> bool {
        self.vectors().is_empty()
    }

    pub fn vectors(&self) -> &[Vec<f32>] {
        match self {
            EmbeddingsPayload::Data(v) | EmbeddingsPayload::Bare(v) => v,
        }
    }

    pub fn into_vectors(self) -> Vec<Vec<f32>> {
        match self {
            EmbeddingsPayload::Data(v) | EmbeddingsPayload::Bare(v) => v,
        }
    }
}

#[derive(Deserialize)]
struct DataShape {
    data: Vec<DataItem>,
}

#[derive(Deserialize)]
struct DataItem {
    #[serde(default)]
    embedding: Option<Vec<f32>>,
    #[serde(default)]
    index: Option<usize>,
}

#[derive(Deserialize)]
struct BareShape {
    embeddings: Vec<Vec<f32>>,
}

/// Items without an embedding are dropped, so the count check downstream
/// catches them. When every item carries an index, vectors are put in
/// index order.
fn parse_data_shape(value: &Value) -> Option<Vec<Vec<f32>>> {
    let shape = DataShape::deserialize(value).ok()?;
    let mut items: Vec<(Option<usize>, Vec<f32>)> = shape
        .data
        .into_iter()
        .filter_map(|item| item.embedding.map(|e| (item.index, e)))
        .collect();

    if items.iter().all(|(index, _)| index.is_some()) {
        items.sort_by_key(|(index, _)| *index);
    }

    Some(items.into_iter().map(|(_, e)| e).collect())
}

fn parse_bare_shape(value: &Value) -> Option<Vec<Vec<f32>>> {
    BareShape::deserialize(value).ok().map(|shape| shape.embeddings)
}

/// Parse a successful response body
pub fn parse_embeddings(body: &str) -> Result<EmbeddingsPayload, EmbeddingError> {
    let value: Value =
        serde_json::from_str(body).map_err(|e| EmbeddingError::InvalidJson(e.to_string()))?;

    if let Some(vectors) = parse_data_shape(&value) {
        return Ok(EmbeddingsPayload::Data(vectors));
    }
    if let Some(vectors) = parse_bare_shape(&value) {
        return Ok(EmbeddingsPayload::Bare(vectors));
    }

    Err(EmbeddingError::UnrecognizedFormat)
}
