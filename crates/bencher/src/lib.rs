#[derive(Debug, Copy, Clone)]
pub struct TestCase {
    name: &'static str,
    group: TestGroup,
    file: TestFile,
    target: &'static str,
}

impl TestCase {
    pub fn new(name: &'static str, group: TestGroup, file: TestFile, target: &'static str) -> Self {
        Self { name, group, file, target }
    }

    pub fn small(name: &'static str, file: TestFile, target: &'static str) -> Self {
        Self::new(name, TestGroup::Small, file, target)
    }

    pub fn large(name: &'static str, file: TestFile, target: &'static str) -> Self {
        Self::new(name, TestGroup::Large, file, target)
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn group(&self) -> TestGroup {
        self.group
    }

    pub fn file(&self) -> &TestFile {
        &self.file
    }

    /// the request path dispatched against the route table
    pub fn target(&self) -> &'static str {
        self.target
    }
}

/// A route table, one `METHOD /path` entry per line.
#[derive(Debug, Copy, Clone)]
pub struct TestFile {
    file_name: &'static str,
    content: &'static str,
}

impl TestFile {
    pub const fn new(file_name: &'static str, content: &'static str) -> Self {
        Self { file_name, content }
    }

    pub fn content(&self) -> &'static str {
        self.content
    }

    pub fn file_name(&self) -> &'static str {
        self.file_name
    }

    /// Returns the `(method, path)` entries, skipping blank lines.
    pub fn routes(&self) -> impl Iterator<Item = (&'static str, &'static str)> {
        self.content.lines().filter_map(|line| line.trim().split_once(' '))
    }
}

#[derive(Clone, Copy, Debug)]
pub enum TestGroup {
    Small,
    Large,
}
