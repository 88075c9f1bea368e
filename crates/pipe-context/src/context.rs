//! Resolution context: the runtime variables of a request and the chain of
//! paths resolved so far.
//!
//! A [`PipeContext`] is created per request from the caller's variables. It
//! is entered through [`PipeContext::session`], which hands back a
//! [`Session`] guard; every successful resolution moves `current` forward and
//! remembers the previous value in `history`.

use std::collections::BTreeMap;
use std::ops::{Deref, DerefMut};

use tracing::{debug, error};

use crate::enums::Platform;
use crate::path;

/// Caller-supplied variables, keyed by token name.
pub type Variables = BTreeMap<String, String>;

/// Value of `context_area` when the caller gives none.
pub const DEFAULT_CONTEXT_AREA: &str = "pipeline";

/// Context fields a template token may name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContextField {
    Asset,
    AssetType,
    ContextArea,
    DiskType,
    Drive,
    Project,
    /// The current context path, written `{context}` in a template.
    Current,
}

impl ContextField {
    pub const ALL: [ContextField; 7] = [
        ContextField::Asset,
        ContextField::AssetType,
        ContextField::ContextArea,
        ContextField::DiskType,
        ContextField::Drive,
        ContextField::Project,
        ContextField::Current,
    ];

    /// The token spelling of this field.
    pub fn token(&self) -> &'static str {
        match self {
            Self::Asset => "asset",
            Self::AssetType => "asset_type",
            Self::ContextArea => "context_area",
            Self::DiskType => "disk_type",
            Self::Drive => "drive",
            Self::Project => "project",
            Self::Current => "context",
        }
    }

    pub fn from_token(token: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|field| field.token() == token)
    }
}

/// The runtime variables of a context, fixed at construction.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContextVars {
    pub asset: Option<String>,
    pub asset_type: Option<String>,
    pub context_area: Option<String>,
    pub disk_type: Option<String>,
    pub drive: Option<String>,
    pub project: Option<String>,
}

impl ContextVars {
    /// Pick the context fields out of `vars`. `drive` falls back to the
    /// platform default and `context_area` to [`DEFAULT_CONTEXT_AREA`].
    pub fn from_vars(vars: &Variables, platform: Platform) -> Self {
        let take = |key: &str| vars.get(key).cloned();
        Self {
            asset: take("asset"),
            asset_type: take("asset_type"),
            context_area: take("context_area").or_else(|| Some(DEFAULT_CONTEXT_AREA.to_string())),
            disk_type: take("disk_type"),
            drive: take("drive").or_else(|| platform.default_drive().map(str::to_string)),
            project: take("project"),
        }
    }
}

/// Mutable state of one resolution request.
#[derive(Debug, Clone)]
pub struct PipeContext {
    current: Option<String>,
    history: Vec<String>,
    vars: ContextVars,
}

impl PipeContext {
    /// Build a context for the running platform.
    pub fn new(vars: &Variables) -> Self {
        Self::with_platform(vars, Platform::current())
    }

    pub fn with_platform(vars: &Variables, platform: Platform) -> Self {
        Self::from_context_vars(ContextVars::from_vars(vars, platform))
    }

    pub fn from_context_vars(vars: ContextVars) -> Self {
        Self {
            current: None,
            history: Vec::new(),
            vars,
        }
    }

    pub fn vars(&self) -> &ContextVars {
        &self.vars
    }

    /// The most recently resolved path.
    pub fn current(&self) -> Option<&str> {
        self.current.as_deref()
    }

    /// Previous distinct values of `current`, oldest first.
    pub fn history(&self) -> &[String] {
        &self.history
    }

    /// Value of a context field, if set.
    pub fn lookup(&self, field: ContextField) -> Option<&str> {
        match field {
            ContextField::Asset => self.vars.asset.as_deref(),
            ContextField::AssetType => self.vars.asset_type.as_deref(),
            ContextField::ContextArea => self.vars.context_area.as_deref(),
            ContextField::DiskType => self.vars.disk_type.as_deref(),
            ContextField::Drive => self.vars.drive.as_deref(),
            ContextField::Project => self.vars.project.as_deref(),
            ContextField::Current => self.current.as_deref(),
        }
    }

    /// Start a session: an unset `current` starts at the drive.
    pub fn enter(&mut self) {
        if self.current.is_some() {
            return;
        }
        match &self.vars.drive {
            Some(drive) => self.current = Some(drive.clone()),
            None => error!("'drive' not set; context starts without a base path"),
        }
    }

    /// Move the context to `path`.
    ///
    /// The old value is pushed onto the history when it differs from both
    /// `path` and the top of the history.
    pub fn set_current(&mut self, path: impl Into<String>) {
        let path = path.into();
        if let Some(old) = self.current.take() {
            if old != path && self.history.last() != Some(&old) {
                self.history.push(old);
            }
        }
        debug!(context = %path, "context changed");
        self.current = Some(path);
    }

    /// Push a path onto the history without changing `current`.
    pub fn push_history(&mut self, path: impl Into<String>) {
        self.history.push(path.into());
    }

    /// End a session and return the final path.
    ///
    /// If the top of the history equals `current` it is popped. This undoes
    /// at most one level and only in that exact case.
    pub fn exit(&mut self) -> Option<String> {
        if self.current.is_some() && self.history.last() == self.current.as_ref() {
            self.history.pop();
        }
        self.current.clone()
    }

    /// `path` relative to the current context, if one is set.
    pub fn relpath(&self, target: &str) -> Option<String> {
        self.current
            .as_deref()
            .map(|start| path::relative_to(target, start))
    }

    /// Enter the context and return a guard that exits it when finished or
    /// dropped.
    pub fn session(&mut self) -> Session<'_> {
        self.enter();
        Session {
            ctx: self,
            finished: false,
        }
    }
}

/// An entered [`PipeContext`]. Exits the context on drop.
#[derive(Debug)]
pub struct Session<'a> {
    ctx: &'a mut PipeContext,
    finished: bool,
}

impl Session<'_> {
    /// Exit the context and return its final path.
    pub fn finish(mut self) -> Option<String> {
        self.finished = true;
        self.ctx.exit()
    }
}

impl Deref for Session<'_> {
    type Target = PipeContext;

    fn deref(&self) -> &PipeContext {
        self.ctx
    }
}

impl DerefMut for Session<'_> {
    fn deref_mut(&mut self) -> &mut PipeContext {
        self.ctx
    }
}

impl Drop for Session<'_> {
    fn drop(&mut self) {
        if !self.finished {
            self.ctx.exit();
        }
    }
}
