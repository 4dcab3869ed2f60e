use std::collections::HashSet;

/// Folder substrings that a URL must contain to be migrated.
///
/// Parsed from a comma-separated list such as `"/samples/rats,/samples/birds"`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FolderFilter {
    folders: Vec<String>,
}

impl FolderFilter {
    /// Parse a comma-separated folder list. Returns `None` when the list holds no
    /// non-blank entries, meaning no filtering was requested.
    pub fn parse(list: &str) -> Option<Self> {
        let folders: Vec<String> = list
            .split(',')
            .map(str::trim)
            .filter(|f| !f.is_empty())
            .map(String::from)
            .collect();
        if folders.is_empty() {
            None
        } else {
            Some(Self { folders })
        }
    }

    pub fn folders(&self) -> &[String] {
        &self.folders
    }

    pub fn matches(&self, url: &str) -> bool {
        self.folders.iter().any(|f| url.contains(f.as_str()))
    }

    /// Keep the URLs that contain at least one folder, each at most once.
    pub fn apply<I>(&self, urls: I) -> Vec<String>
    where
        I: IntoIterator<Item = String>,
    {
        let mut seen = HashSet::new();
        urls.into_iter()
            .filter(|url| self.matches(url))
            .filter(|url| seen.insert(url.clone()))
            .collect()
    }
}
