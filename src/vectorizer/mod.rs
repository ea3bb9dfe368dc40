pub mod analyzer;
pub mod compare;
pub mod corpus;
pub mod count;
pub mod document;
pub mod export;
pub mod params;
pub mod stop_words;
pub mod tfidf;
pub mod token;
pub mod vocabulary;
