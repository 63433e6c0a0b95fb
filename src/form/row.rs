use std::fmt;

/// How a row's value is entered and rendered into the command line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RowKind {
    /// A flag or option whose value is emitted bare
    #[default]
    Toggle,
    File,
    Directory,
    /// Free text, possibly multi-line
    Text,
}

impl RowKind {
    pub const ALL: [RowKind; 4] = [
        RowKind::Toggle,
        RowKind::File,
        RowKind::Directory,
        RowKind::Text,
    ];

    /// Tag used in the persisted configuration document.
    #[must_use]
    pub fn tag(self) -> &'static str {
        match self {
            RowKind::Toggle => "开关",
            RowKind::File => "文件",
            RowKind::Directory => "目录",
            RowKind::Text => "文本",
        }
    }

    /// Parse a persisted tag. Unknown tags yield `None`.
    #[must_use]
    pub fn from_tag(tag: &str) -> Option<RowKind> {
        Self::ALL.into_iter().find(|kind| kind.tag() == tag)
    }

    /// Short label for the form editor.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            RowKind::Toggle => "Toggle",
            RowKind::File => "File",
            RowKind::Directory => "Dir",
            RowKind::Text => "Text",
        }
    }

    /// The next kind in editor order, wrapping around.
    #[must_use]
    pub fn next(self) -> RowKind {
        match self {
            RowKind::Toggle => RowKind::File,
            RowKind::File => RowKind::Directory,
            RowKind::Directory => RowKind::Text,
            RowKind::Text => RowKind::Toggle,
        }
    }

    /// Whether the value is a filesystem path.
    #[must_use]
    pub fn is_path(self) -> bool {
        matches!(self, RowKind::File | RowKind::Directory)
    }
}

impl fmt::Display for RowKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Kinds assigned to the first rows of a fresh tab, by position
pub const DEFAULT_ROW_KINDS: [RowKind; 5] = [
    RowKind::Toggle,
    RowKind::Toggle,
    RowKind::File,
    RowKind::Directory,
    RowKind::Text,
];

/// Candidate values offered on the first row of a fresh tab
pub const DEFAULT_MODEL_OPTIONS: [&str; 5] = [
    "qwen-long-2025-01-25",
    "qwen-vl-max",
    "qwen-long-latest",
    "qwen-turbo-latest",
    "qwen-max-latest",
];

const DEFAULT_MODEL_KEY: &str = "-m";
const DEFAULT_TEXT_KEY: &str = "-dq";
const DEFAULT_TEXT_VALUE: &str = "tell me a joke";

/// One key/value parameter contributing a token group to the built command
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ParameterRow {
    pub kind: RowKind,
    pub key: String,
    pub value: String,
    /// Candidate values; only meaningful for non-text kinds
    pub options: Vec<String>,
}

impl ParameterRow {
    #[must_use]
    pub fn new(kind: RowKind, key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            kind,
            key: key.into(),
            value: value.into(),
            options: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_options(mut self, options: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.options = options.into_iter().map(Into::into).collect();
        self
    }

    /// A row as created at `index` in a fresh tab.
    ///
    /// The first row carries the model flag and its candidates, text rows carry a
    /// sample prompt, everything else starts empty.
    #[must_use]
    pub fn with_index_defaults(index: usize) -> Self {
        let kind = DEFAULT_ROW_KINDS.get(index).copied().unwrap_or_default();
        if index == 0 {
            ParameterRow::new(kind, DEFAULT_MODEL_KEY, DEFAULT_MODEL_OPTIONS[0])
                .with_options(DEFAULT_MODEL_OPTIONS)
        } else if kind == RowKind::Text {
            ParameterRow::new(kind, DEFAULT_TEXT_KEY, DEFAULT_TEXT_VALUE)
        } else {
            ParameterRow::new(kind, "", "")
        }
    }

    /// Change the kind. The value is kept as-is.
    pub fn set_kind(&mut self, kind: RowKind) {
        self.kind = kind;
    }

    /// Reset key and value, keeping kind and candidate options.
    pub fn clear(&mut self) {
        self.key.clear();
        self.value.clear();
    }

    /// Step the value through `options` by `delta` positions, wrapping.
    ///
    /// Starts from the option matching the current value, or from the edges when the
    /// value is not one of the options. Returns `false` when there is nothing to cycle.
    pub fn cycle_option(&mut self, delta: isize) -> bool {
        if self.options.is_empty() || self.kind == RowKind::Text {
            return false;
        }
        let len = self.options.len();
        let step = delta.unsigned_abs() % len;
        let next = match self.options.iter().position(|o| *o == self.value) {
            Some(current) if delta >= 0 => (current + step) % len,
            Some(current) => (current + len - step) % len,
            None if delta >= 0 => 0,
            None => len - 1,
        };
        self.value.clone_from(&self.options[next]);
        true
    }
}
