// Integration test utilities and common code

use std::path::{Path, PathBuf};
use std::fs;
use tempfile::TempDir;

/// Test fixture helper for creating temporary corpora of CoNLL-U files
pub struct TestFixture {
    pub temp_dir: TempDir,
    pub root_path: PathBuf,
}

impl TestFixture {
    /// Create a new test fixture with temporary directory
    pub fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let root_path = temp_dir.path().to_path_buf();

        Self {
            temp_dir,
            root_path,
        }
    }

    /// Create a file with raw content, making parent directories as needed
    pub fn create_file<P: AsRef<Path>>(&self, relative_path: P, content: &[u8]) -> PathBuf {
        let file_path = self.root_path.join(relative_path);

        if let Some(parent) = file_path.parent() {
            fs::create_dir_all(parent).expect("Failed to create parent directories");
        }

        fs::write(&file_path, content).expect("Failed to write test file");
        file_path
    }

    /// Create a CoNLL-U file from sentences given as `(form, lemma, upos)` rows
    pub fn create_conllu_file<P: AsRef<Path>>(&self, relative_path: P, sentences: &[&[(&str, &str, &str)]]) -> PathBuf {
        self.create_file(relative_path, to_conllu(sentences).as_bytes())
    }

    /// Directory for run outputs inside the fixture
    pub fn out_dir(&self) -> PathBuf {
        let dir = self.root_path.join("out");
        fs::create_dir_all(&dir).expect("Failed to create output directory");
        dir
    }
}

/// Render sentences in 10-column CoNLL-U layout
pub fn to_conllu(sentences: &[&[(&str, &str, &str)]]) -> String {
    let mut out = String::new();
    for (n, sentence) in sentences.iter().enumerate() {
        out.push_str(&format!("# sent_id = {}\n", n + 1));
        for (i, (form, lemma, upos)) in sentence.iter().enumerate() {
            out.push_str(&format!("{}\t{}\t{}\t{}\t_\t_\t0\tdep\t_\t_\n", i + 1, form, lemma, upos));
        }
        out.push('\n');
    }
    out
}

/// "К счастью, он, впрочем, пришёл."
pub const FORTUNATELY: &[(&str, &str, &str)] = &[
    ("К", "к", "ADP"),
    ("счастью", "счастье", "NOUN"),
    (",", ",", "PUNCT"),
    ("он", "он", "PRON"),
    (",", ",", "PUNCT"),
    ("впрочем", "впрочем", "ADV"),
    (",", ",", "PUNCT"),
    ("пришёл", "прийти", "VERB"),
    (".", ".", "PUNCT"),
];

/// "Москва, Россия, большой город."
pub const MOSCOW: &[(&str, &str, &str)] = &[
    ("Москва", "Москва", "PROPN"),
    (",", ",", "PUNCT"),
    ("Россия", "Россия", "PROPN"),
    (",", ",", "PUNCT"),
    ("большой", "большой", "ADJ"),
    ("город", "город", "NOUN"),
    (".", ".", "PUNCT"),
];

/// "С одной стороны, однако, это дело вкуса."
pub const ONE_SIDE: &[(&str, &str, &str)] = &[
    ("С", "с", "ADP"),
    ("одной", "один", "NUM"),
    ("стороны", "сторона", "NOUN"),
    (",", ",", "PUNCT"),
    ("однако", "однако", "ADV"),
    (",", ",", "PUNCT"),
    ("это", "это", "PRON"),
    ("дело", "дело", "NOUN"),
    ("вкуса", "вкус", "NOUN"),
    (".", ".", "PUNCT"),
];

/// "В 1812 году, кстати, было холодно."
pub const YEAR: &[(&str, &str, &str)] = &[
    ("В", "в", "ADP"),
    ("1812", "1812", "ADJ"),
    ("году", "год", "NOUN"),
    (",", ",", "PUNCT"),
    ("кстати", "кстати", "ADV"),
    (",", ",", "PUNCT"),
    ("было", "быть", "AUX"),
    ("холодно", "холодно", "ADV"),
    (".", ".", "PUNCT"),
];
