//! Fixed demonstration corpus run when the binary is started without a subcommand.

pub const DEMO_CORPUS: [&str; 6] = [
    "Cats and dogs are excellent pets for your home",
    "Biotech companies develop novel therapeutics that aid humanity",
    "Hospitals help patients by treating them with medicines",
    "Macbooks are great devices to develop code and create content",
    "Tea is one of the worlds oldest drinks dating back thousands of years",
    "Boston is a beautiful city full of exciting places to visit",
];

pub const DEMO_QUERY: &str = "What is Boston known for?";
pub const DEMO_BATCH_SIZE: usize = 32;
pub const DEMO_TOP_K: u32 = 5;

pub fn demo_corpus() -> Vec<String> {
    DEMO_CORPUS.iter().map(|s| s.to_string()).collect()
}
