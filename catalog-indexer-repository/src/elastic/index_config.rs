//! Search index configuration and mappings.
//!
//! This module defines the index settings and mappings for the movie index.

use serde_json::{json, Value};

/// Index the movie documents are written to unless configured otherwise.
pub const DEFAULT_INDEX_NAME: &str = "movies";

/// Configuration for the search index.
#[derive(Debug, Clone)]
pub struct IndexConfig {
    /// The index name used in bulk directives and index creation.
    pub name: String,
}

impl IndexConfig {
    /// Create a new index configuration.
    ///
    /// # Arguments
    ///
    /// * `name` - The index name
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self::new(DEFAULT_INDEX_NAME)
    }
}

/// Get the index settings and mappings for the movie index.
///
/// The configuration includes:
/// - **english analyzer**: Lowercased, stop-word filtered and stemmed text
///   for titles, descriptions and the flattened name fields
/// - **keyword fields**: Ids, genres and the raw title for exact lookups
/// - **nested persons**: `actors` and `writers` keep id/name pairs together
pub fn get_index_settings() -> Value {
    json!({
        "settings": {
            "refresh_interval": "1s",
            "analysis": {
                "filter": {
                    "english_stop": {
                        "type": "stop",
                        "stopwords": "_english_"
                    },
                    "english_stemmer": {
                        "type": "stemmer",
                        "language": "english"
                    },
                    "english_possessive_stemmer": {
                        "type": "stemmer",
                        "language": "possessive_english"
                    }
                },
                "analyzer": {
                    "catalog_english": {
                        "tokenizer": "standard",
                        "filter": [
                            "lowercase",
                            "english_stop",
                            "english_stemmer",
                            "english_possessive_stemmer"
                        ]
                    }
                }
            }
        },
        "mappings": {
            "dynamic": "strict",
            "properties": {
                "id": {
                    "type": "keyword"
                },
                "imdb_rating": {
                    "type": "float"
                },
                "genre": {
                    "type": "keyword"
                },
                "title": {
                    "type": "text",
                    "analyzer": "catalog_english",
                    "fields": {
                        "raw": {
                            "type": "keyword"
                        }
                    }
                },
                "description": {
                    "type": "text",
                    "analyzer": "catalog_english"
                },
                "director": {
                    "type": "text",
                    "analyzer": "catalog_english"
                },
                "actors_names": {
                    "type": "text",
                    "analyzer": "catalog_english"
                },
                "writers_names": {
                    "type": "text",
                    "analyzer": "catalog_english"
                },
                "actors": {
                    "type": "nested",
                    "dynamic": "strict",
                    "properties": {
                        "id": {
                            "type": "keyword"
                        },
                        "name": {
                            "type": "text",
                            "analyzer": "catalog_english"
                        }
                    }
                },
                "writers": {
                    "type": "nested",
                    "dynamic": "strict",
                    "properties": {
                        "id": {
                            "type": "keyword"
                        },
                        "name": {
                            "type": "text",
                            "analyzer": "catalog_english"
                        }
                    }
                }
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mapping_covers_every_document_field() {
        let settings = get_index_settings();
        let properties = &settings["mappings"]["properties"];

        for field in [
            "id",
            "title",
            "description",
            "imdb_rating",
            "genre",
            "director",
            "actors_names",
            "writers_names",
            "actors",
            "writers",
        ] {
            assert!(properties[field].is_object(), "missing mapping for {}", field);
        }
    }

    #[test]
    fn test_persons_are_nested() {
        let settings = get_index_settings();
        assert_eq!(settings["mappings"]["properties"]["actors"]["type"], "nested");
        assert_eq!(settings["mappings"]["properties"]["writers"]["type"], "nested");
    }

    #[test]
    fn test_default_index_name() {
        assert_eq!(IndexConfig::default().name, "movies");
    }
}
