// Export tests: labeled CSV tables written to disk and read back.

use std::fs;

use text_feature_vectorizer::{
    cosine_similarity_matrix, CountVectorizer, Documents, LabeledTable, TfidfParams,
    TfidfVectorizer, VectorizerError, VectorizerParams,
};

const DOCUMENTS: [&str; 3] = [
    "all the kings men",
    "ate all the kings hens",
    "until they all got tired and went to sleep zzz",
];

fn documents() -> Documents {
    Documents::from_columns(vec!["Doc 1", "Doc 2", "Doc 3"], DOCUMENTS.to_vec()).unwrap()
}

fn read_back(path: &std::path::Path) -> Vec<Vec<String>> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(false)
        .from_path(path)
        .unwrap();
    rdr.records()
        .map(|r| r.unwrap().iter().map(str::to_string).collect())
        .collect()
}

const HEADER: [&str; 17] = [
    "txt.filename", "txt.contents", "all", "and", "ate", "got", "hens", "kings", "men", "sleep",
    "the", "they", "tired", "to", "until", "went", "zzz",
];

#[test]
fn count_table_csv() {
    let docs = documents();
    let cv = CountVectorizer::new(VectorizerParams::new()).unwrap();
    let (vocab, counts) = cv.fit_transform(&docs.contents()).unwrap();
    let table = LabeledTable::new(&docs, &vocab, counts)
        .unwrap()
        .with_metadata_columns("txt.filename", "txt.contents");
    assert_eq!(table.shape(), (3, 17));
    assert_eq!(table.columns(), HEADER.to_vec());

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("counts_matrix.csv");
    table.to_csv_path(&path).unwrap();

    let rows = read_back(&path);
    assert_eq!(rows.len(), 4);
    assert_eq!(rows[0], HEADER.to_vec());
    assert_eq!(
        rows[1],
        vec![
            "Doc 1", "all the kings men", "1", "0", "0", "0", "0", "1", "1", "0", "1", "0", "0",
            "0", "0", "0", "0"
        ]
    );
}

#[test]
fn tfidf_table_csv() {
    let docs = documents();
    let tv = TfidfVectorizer::new(VectorizerParams::new(), TfidfParams::default()).unwrap();
    let (model, matrix) = tv.fit_transform(&docs.contents()).unwrap();
    let table = LabeledTable::new(&docs, &model.vocabulary, matrix)
        .unwrap()
        .with_metadata_columns("txt.filename", "txt.contents");

    let mut out = Vec::new();
    table.write_csv(&mut out).unwrap();
    let mut rdr = csv::Reader::from_reader(out.as_slice());
    let header: Vec<String> = rdr.headers().unwrap().iter().map(str::to_string).collect();
    assert_eq!(header, HEADER.to_vec());

    let first = rdr.records().next().unwrap().unwrap();
    assert_eq!(&first[0], "Doc 1");
    assert_eq!(&first[1], "all the kings men");
    let expected = [
        0.3731188059313277, 0.0, 0.0, 0.0, 0.0, 0.4804583972923858, 0.6317450542765208, 0.0,
        0.4804583972923858, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0,
    ];
    for (cell, e) in first.iter().skip(2).zip(expected) {
        let v: f64 = cell.parse().unwrap();
        assert!((v - e).abs() < 1e-12, "{cell} vs {e}");
    }
    // zero cells use the plain Display form
    assert_eq!(&first[3], "0");
}

#[test]
fn contents_with_commas_are_quoted() {
    let docs = Documents::from_columns(vec!["a"], vec!["kings, hens"]).unwrap();
    let cv = CountVectorizer::new(VectorizerParams::new()).unwrap();
    let (vocab, counts) = cv.fit_transform(&docs.contents()).unwrap();
    let mut out = Vec::new();
    LabeledTable::new(&docs, &vocab, counts)
        .unwrap()
        .write_csv(&mut out)
        .unwrap();
    assert_eq!(
        String::from_utf8(out).unwrap(),
        "filename,contents,hens,kings\na,\"kings, hens\",1,1\n"
    );
}

#[test]
fn csv_input_roundtrip_through_the_pipeline() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("texts.csv");
    fs::write(
        &input,
        "txt.filename,txt.contents\nDoc 1,all the kings men\nDoc 2,ate all the kings hens\n",
    )
    .unwrap();
    let docs = Documents::from_csv_path(&input, "txt.filename", "txt.contents").unwrap();
    assert_eq!(docs.filenames(), vec!["Doc 1", "Doc 2"]);

    let missing = Documents::from_csv_path(&input, "filename", "txt.contents").unwrap_err();
    assert!(matches!(missing, VectorizerError::MissingColumn(_)));
}

#[test]
fn mismatched_metadata_is_rejected() {
    let docs = Documents::from_columns(vec!["only one"], vec!["kings"]).unwrap();
    let cv = CountVectorizer::new(VectorizerParams::new()).unwrap();
    let (vocab, counts) = cv.fit_transform(&DOCUMENTS).unwrap();
    let err = LabeledTable::new(&docs, &vocab, counts).unwrap_err();
    assert!(matches!(
        err,
        VectorizerError::ShapeMismatch { expected: 1, actual: 3, .. }
    ));
}

#[test]
fn similarity_table_csv() {
    let docs = documents();
    let cv = CountVectorizer::new(VectorizerParams::new()).unwrap();
    let (_, counts) = cv.fit_transform(&docs.contents()).unwrap();
    let sim = cosine_similarity_matrix(&counts);

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("similarity.csv");
    sim.write_csv(&docs.filenames(), fs::File::create(&path).unwrap())
        .unwrap();

    let rows = read_back(&path);
    assert_eq!(rows[0], vec!["filename", "Doc 1", "Doc 2", "Doc 3"]);
    assert_eq!(rows[1][0], "Doc 1");
    assert_eq!(rows[1][1], "1");
    // shared terms all, the, kings out of 4 and 5 terms
    let s12: f64 = rows[1][2].parse().unwrap();
    assert!((s12 - 3.0 / (4.0f64 * 5.0).sqrt()).abs() < 1e-12);
}
