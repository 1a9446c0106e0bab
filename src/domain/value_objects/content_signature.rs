/// Content digest of a selected image file, used to reject duplicates.
///
/// Two files with the same bytes share a signature regardless of their names.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ContentSignature(String);

impl ContentSignature {
    /// Compute the signature of the given bytes
    pub fn compute(data: &[u8]) -> Self {
        Self(format!("{:x}", md5::compute(data)))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ContentSignature {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
