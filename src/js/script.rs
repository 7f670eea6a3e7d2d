/// When a `<script>` runs relative to parsing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ScriptExecution {
    #[default]
    Blocking,
    Async,
    Defer,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ScriptKind {
    #[default]
    Classic,
    Module,
    /// A `type` the engine does not evaluate, such as JSON data blocks.
    Unknown,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScriptSource {
    Inline { code: String },
    External { src: String },
}

/// One `<script>` element found in a page, in document order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScriptDescriptor {
    pub index: usize,
    pub kind: ScriptKind,
    pub execution: ScriptExecution,
    pub source: ScriptSource,
}

impl ScriptDescriptor {
    pub fn inline(index: usize, code: String, kind: ScriptKind) -> Self {
        Self {
            index,
            kind,
            execution: ScriptExecution::Blocking,
            source: ScriptSource::Inline { code },
        }
    }

    pub fn inline_code(&self) -> Option<&str> {
        match &self.source {
            ScriptSource::Inline { code } => Some(code),
            ScriptSource::External { .. } => None,
        }
    }

    /// Inline classic scripts that block parsing are the ones run in place.
    pub fn runs_inline(&self) -> bool {
        self.kind == ScriptKind::Classic
            && self.execution == ScriptExecution::Blocking
            && self.inline_code().is_some()
    }

    pub fn filename(&self) -> String {
        format!("inline-script-{}.js", self.index)
    }
}
