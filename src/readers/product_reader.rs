use crate::error::Result;
use crate::models::DerivedProduct;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

pub struct ProductReader;

impl ProductReader {
    pub fn new() -> Self {
        Self
    }

    /// Read the fields the aggregators consume from a derived product.
    pub fn read(&self, path: &Path) -> Result<DerivedProduct> {
        let file = File::open(path)?;
        let product = serde_json::from_reader(BufReader::new(file))?;
        Ok(product)
    }
}

impl Default for ProductReader {
    fn default() -> Self {
        Self::new()
    }
}
