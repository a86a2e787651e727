//! Simulated terminal sessions.
//!
//! No process is ever spawned.  Each command line is split on whitespace and
//! dispatched through [`COMMANDS`], a fixed table of pure handlers that turn
//! arguments plus a read-only [`CommandContext`] into output lines and an
//! optional [`Effect`] on the session.

use chrono::Local;

use super::tree::{FileTree, NodeId};

/// Cap on retained scrollback lines per session.
pub const MAX_LINES: usize = 1000;

pub type TerminalId = usize;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineKind {
    /// Echo of a submitted command, prompt included.
    Command,
    Output,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TermLine {
    pub kind: LineKind,
    pub text: String,
}

impl TermLine {
    pub fn output(text: impl Into<String>) -> Self {
        Self {
            kind: LineKind::Output,
            text: text.into(),
        }
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self {
            kind: LineKind::Error,
            text: text.into(),
        }
    }
}

/// State change requested by a handler, applied by the session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    Clear,
    /// New working directory, as a tree path (empty = project root).
    ChangeDir(String),
    /// Close this session.
    Exit,
}

#[derive(Debug, Default)]
pub struct CommandOutput {
    pub lines: Vec<TermLine>,
    pub effect: Option<Effect>,
}

impl CommandOutput {
    fn lines(lines: Vec<TermLine>) -> Self {
        Self {
            lines,
            effect: None,
        }
    }

    fn line(line: TermLine) -> Self {
        Self::lines(vec![line])
    }

    fn effect(effect: Effect) -> Self {
        Self {
            lines: Vec::new(),
            effect: Some(effect),
        }
    }
}

/// Read-only view handed to every handler.
pub struct CommandContext<'a> {
    pub tree: &'a FileTree,
    /// Working directory as a tree path.
    pub cwd: &'a str,
    pub user: &'a str,
    pub history: &'a [String],
}

type Handler = fn(&[&str], &CommandContext) -> CommandOutput;

/// Name, one-line help, handler.
pub static COMMANDS: &[(&str, &str, Handler)] = &[
    ("help", "list available commands", cmd_help),
    ("clear", "clear the terminal", |_, _| CommandOutput::effect(Effect::Clear)),
    ("echo", "print arguments", |args, _| {
        CommandOutput::line(TermLine::output(args.join(" ")))
    }),
    ("pwd", "print working directory", |_, ctx| {
        CommandOutput::line(TermLine::output(display_dir(ctx.tree, ctx.cwd)))
    }),
    ("cd", "change directory", cmd_cd),
    ("ls", "list directory contents", cmd_ls),
    ("cat", "print file contents", cmd_cat),
    ("whoami", "print the current user", |_, ctx| {
        CommandOutput::line(TermLine::output(ctx.user))
    }),
    ("date", "print the current date and time", |_, _| {
        let now = Local::now().format("%a %b %e %H:%M:%S %Y").to_string();
        CommandOutput::line(TermLine::output(now))
    }),
    ("history", "show command history", |_, ctx| {
        CommandOutput::lines(
            ctx.history
                .iter()
                .enumerate()
                .map(|(i, h)| TermLine::output(format!("{:>5}  {h}", i + 1)))
                .collect(),
        )
    }),
    ("uname", "print system information", |args, _| {
        let text = if args.first() == Some(&"-a") {
            "codeshell 0.1.0 simulated x86_64"
        } else {
            "codeshell"
        };
        CommandOutput::line(TermLine::output(text))
    }),
    ("node", "simulated Node.js", |args, _| match args.first() {
        Some(&"-v") | Some(&"--version") => CommandOutput::line(TermLine::output("v20.11.0")),
        _ => CommandOutput::line(TermLine::error(
            "node: only --version is available in this terminal",
        )),
    }),
    ("npm", "simulated npm", cmd_npm),
    ("git", "simulated git", cmd_git),
    ("exit", "close the terminal", |_, _| CommandOutput::effect(Effect::Exit)),
];

fn cmd_help(_: &[&str], _: &CommandContext) -> CommandOutput {
    let mut lines = vec![TermLine::output("Available commands:")];
    lines.extend(
        COMMANDS
            .iter()
            .map(|(name, help, _)| TermLine::output(format!("  {name:<8} {help}"))),
    );
    CommandOutput::lines(lines)
}

fn cmd_cd(args: &[&str], ctx: &CommandContext) -> CommandOutput {
    let target = args.first().copied().unwrap_or("~");
    match resolve(ctx.tree, ctx.cwd, target) {
        Some(id) if ctx.tree.get(id).is_folder => {
            CommandOutput::effect(Effect::ChangeDir(ctx.tree.path_of(id)))
        }
        Some(_) => CommandOutput::line(TermLine::error(format!("cd: not a directory: {target}"))),
        None => CommandOutput::line(TermLine::error(format!(
            "cd: no such file or directory: {target}"
        ))),
    }
}

fn cmd_ls(args: &[&str], ctx: &CommandContext) -> CommandOutput {
    let show_all = args.iter().any(|a| a.starts_with('-') && a.contains('a'));
    let target = args.iter().find(|a| !a.starts_with('-')).copied().unwrap_or(".");
    let Some(id) = resolve(ctx.tree, ctx.cwd, target) else {
        return CommandOutput::line(TermLine::error(format!(
            "ls: cannot access '{target}': No such file or directory"
        )));
    };
    let node = ctx.tree.get(id);
    if !node.is_folder {
        return CommandOutput::line(TermLine::output(node.name.clone()));
    }
    let names: Vec<String> = node
        .children
        .iter()
        .map(|&c| ctx.tree.get(c))
        .filter(|c| show_all || !c.name.starts_with('.'))
        .map(|c| {
            if c.is_folder {
                format!("{}/", c.name)
            } else {
                c.name.clone()
            }
        })
        .collect();
    if names.is_empty() {
        return CommandOutput::default();
    }
    CommandOutput::line(TermLine::output(names.join("  ")))
}

fn cmd_cat(args: &[&str], ctx: &CommandContext) -> CommandOutput {
    if args.is_empty() {
        return CommandOutput::line(TermLine::error("cat: missing file operand"));
    }
    let mut lines = Vec::new();
    for &arg in args {
        match resolve(ctx.tree, ctx.cwd, arg).map(|id| ctx.tree.get(id)) {
            Some(node) if node.is_folder => {
                lines.push(TermLine::error(format!("cat: {arg}: Is a directory")));
            }
            Some(node) => {
                let content = node.content.as_deref().unwrap_or("");
                lines.extend(content.lines().map(TermLine::output));
            }
            None => lines.push(TermLine::error(format!(
                "cat: {arg}: No such file or directory"
            ))),
        }
    }
    CommandOutput::lines(lines)
}

fn cmd_npm(args: &[&str], ctx: &CommandContext) -> CommandOutput {
    let out = |lines: &[&str]| {
        CommandOutput::lines(lines.iter().map(|l| TermLine::output(*l)).collect())
    };
    match args.first().copied() {
        Some("-v") | Some("--version") => out(&["10.2.4"]),
        Some("install") | Some("i") => out(&[
            "",
            "added 0 packages, and audited 1 package in 312ms",
            "",
            "found 0 vulnerabilities",
        ]),
        Some("start") | Some("run") => {
            let script = if args.first() == Some(&"run") {
                args.get(1).copied().unwrap_or("")
            } else {
                "start"
            };
            let banner = format!("> {}@1.0.0 {script}", ctx.tree.get(ctx.tree.root).name);
            out(&[
                "",
                banner.as_str(),
                "",
                "Serving on http://localhost:3000 (simulated)",
            ])
        }
        Some(other) => CommandOutput::line(TermLine::error(format!(
            "npm: unknown command \"{other}\""
        ))),
        None => out(&["Usage: npm <install|start|run|--version>"]),
    }
}

fn cmd_git(args: &[&str], _: &CommandContext) -> CommandOutput {
    match args.first().copied() {
        Some("status") => CommandOutput::lines(vec![
            TermLine::output("On branch main"),
            TermLine::output("nothing to commit, working tree clean"),
        ]),
        Some("branch") => CommandOutput::line(TermLine::output("* main")),
        Some("--version") => CommandOutput::line(TermLine::output("git version 2.43.0")),
        Some(other) => CommandOutput::line(TermLine::error(format!(
            "git: '{other}' is not available in this terminal"
        ))),
        None => CommandOutput::line(TermLine::output("usage: git <status|branch|--version>")),
    }
}

/// Resolve a shell-style path against `cwd`.  `~` and `/` both mean the
/// project root.
fn resolve(tree: &FileTree, cwd: &str, target: &str) -> Option<NodeId> {
    let (mut parts, rest): (Vec<&str>, &str) =
        if let Some(rest) = target.strip_prefix('~').or_else(|| target.strip_prefix('/')) {
            (Vec::new(), rest)
        } else {
            (cwd.split('/').filter(|p| !p.is_empty()).collect(), target)
        };
    for seg in rest.split('/') {
        match seg {
            "" | "." => {}
            ".." => {
                parts.pop();
            }
            s => parts.push(s),
        }
    }
    tree.find_path(&parts.join("/"))
}

/// Directory as shown by `pwd` and the prompt.
fn display_dir(tree: &FileTree, cwd: &str) -> String {
    let root = &tree.get(tree.root).name;
    if cwd.is_empty() {
        format!("~/{root}")
    } else {
        format!("~/{root}/{cwd}")
    }
}

// ───────────────────────────────────────── session ───────────

#[derive(Debug, Clone)]
pub struct Terminal {
    pub id: TerminalId,
    pub lines: Vec<TermLine>,
    pub input: String,
    pub history: Vec<String>,
    /// Position while browsing history with Up/Down; `None` when editing
    /// a fresh line.
    history_pos: Option<usize>,
    /// Working directory as a tree path.
    pub cwd: String,
    pub user: String,
}

impl Terminal {
    pub fn new(id: TerminalId, user: &str) -> Self {
        Self {
            id,
            lines: vec![TermLine::output("Type 'help' to list available commands.")],
            input: String::new(),
            history: Vec::new(),
            history_pos: None,
            cwd: String::new(),
            user: user.to_string(),
        }
    }

    pub fn title(&self) -> String {
        format!("{}: bash", self.id)
    }

    pub fn prompt(&self, tree: &FileTree) -> String {
        format!("{}@codeshell:{}$ ", self.user, display_dir(tree, &self.cwd))
    }

    pub fn push_char(&mut self, c: char) {
        self.input.push(c);
        self.history_pos = None;
    }

    pub fn backspace(&mut self) {
        self.input.pop();
        self.history_pos = None;
    }

    /// Step back through history (Up).
    pub fn history_prev(&mut self) {
        if self.history.is_empty() {
            return;
        }
        let pos = match self.history_pos {
            Some(p) => p.saturating_sub(1),
            None => self.history.len() - 1,
        };
        self.history_pos = Some(pos);
        self.input = self.history[pos].clone();
    }

    /// Step forward through history (Down); past the newest entry the input
    /// is cleared.
    pub fn history_next(&mut self) {
        let Some(pos) = self.history_pos else {
            return;
        };
        if pos + 1 < self.history.len() {
            self.history_pos = Some(pos + 1);
            self.input = self.history[pos + 1].clone();
        } else {
            self.history_pos = None;
            self.input.clear();
        }
    }

    /// Run the current input line.  Returns `true` when the command asked
    /// for the session to be closed.
    #[must_use]
    pub fn submit(&mut self, tree: &FileTree) -> bool {
        let line = std::mem::take(&mut self.input);
        self.history_pos = None;
        self.lines.push(TermLine {
            kind: LineKind::Command,
            text: format!("{}{line}", self.prompt(tree)),
        });
        let trimmed = line.trim();
        if trimmed.is_empty() {
            return false;
        }
        self.history.push(trimmed.to_string());

        let output = self.execute(trimmed, tree);
        self.lines.extend(output.lines);
        let exit = match output.effect {
            Some(Effect::Clear) => {
                self.lines.clear();
                false
            }
            Some(Effect::ChangeDir(dir)) => {
                self.cwd = dir;
                false
            }
            Some(Effect::Exit) => true,
            None => false,
        };
        self.trim_scrollback();
        exit
    }

    /// Ctrl+C: echo the abandoned line and start a fresh one.
    pub fn interrupt(&mut self, tree: &FileTree) {
        let line = std::mem::take(&mut self.input);
        self.history_pos = None;
        self.lines.push(TermLine {
            kind: LineKind::Command,
            text: format!("{}{line}^C", self.prompt(tree)),
        });
        self.trim_scrollback();
    }

    fn trim_scrollback(&mut self) {
        if self.lines.len() > MAX_LINES {
            let excess = self.lines.len() - MAX_LINES;
            self.lines.drain(..excess);
        }
    }

    fn execute(&self, line: &str, tree: &FileTree) -> CommandOutput {
        let mut words = line.split_whitespace();
        let Some(name) = words.next() else {
            return CommandOutput::default();
        };
        let args: Vec<&str> = words.collect();
        let ctx = CommandContext {
            tree,
            cwd: &self.cwd,
            user: &self.user,
            history: &self.history,
        };
        match COMMANDS.iter().find(|(n, _, _)| *n == name) {
            Some((_, _, handler)) => {
                tracing::debug!("terminal {}: {name} {args:?}", self.id);
                handler(&args, &ctx)
            }
            None => CommandOutput::line(TermLine::error(format!("{name}: command not found"))),
        }
    }
}

// ───────────────────────────────────────── sessions ──────────

/// All terminal sessions of the bottom panel.
#[derive(Debug, Default)]
pub struct TerminalSessions {
    pub terminals: Vec<Terminal>,
    /// Index into `terminals`.
    pub active: usize,
    next_id: TerminalId,
}

impl TerminalSessions {
    pub fn new() -> Self {
        Self {
            terminals: Vec::new(),
            active: 0,
            next_id: 1,
        }
    }

    /// Open a new session and make it active.
    pub fn create(&mut self, user: &str) -> TerminalId {
        let id = self.next_id;
        self.next_id += 1;
        self.terminals.push(Terminal::new(id, user));
        self.active = self.terminals.len() - 1;
        id
    }

    /// Close the active session.  Returns `false` once none are left.
    pub fn close_active(&mut self) -> bool {
        if self.terminals.is_empty() {
            return false;
        }
        self.terminals.remove(self.active);
        self.active = self.active.min(self.terminals.len().saturating_sub(1));
        !self.terminals.is_empty()
    }

    pub fn cycle(&mut self, offset: isize) {
        if self.terminals.is_empty() {
            return;
        }
        let len = self.terminals.len() as isize;
        self.active = (self.active as isize + offset).rem_euclid(len) as usize;
    }

    pub fn active(&self) -> Option<&Terminal> {
        self.terminals.get(self.active)
    }

    pub fn active_mut(&mut self) -> Option<&mut Terminal> {
        self.terminals.get_mut(self.active)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::tree::sample_project;

    fn run(term: &mut Terminal, tree: &FileTree, line: &str) -> Vec<TermLine> {
        let before = term.lines.len();
        term.input = line.to_string();
        let _ = term.submit(tree);
        term.lines[before.min(term.lines.len())..].to_vec()
    }

    #[test]
    fn echo_and_prompt_line() {
        let tree = sample_project();
        let mut term = Terminal::new(1, "dev");
        let out = run(&mut term, &tree, "echo hello   world");
        assert_eq!(out[0].kind, LineKind::Command);
        assert_eq!(out[0].text, "dev@codeshell:~/my-project$ echo hello   world");
        assert_eq!(out[1], TermLine::output("hello world"));
    }

    #[test]
    fn unknown_command_is_an_error_line() {
        let tree = sample_project();
        let mut term = Terminal::new(1, "dev");
        let out = run(&mut term, &tree, "rm -rf /");
        assert_eq!(out[1], TermLine::error("rm: command not found"));
    }

    #[test]
    fn cd_ls_pwd_follow_the_tree() {
        let tree = sample_project();
        let mut term = Terminal::new(1, "dev");
        run(&mut term, &tree, "cd src/utils");
        assert_eq!(term.cwd, "src/utils");
        let out = run(&mut term, &tree, "pwd");
        assert_eq!(out[1].text, "~/my-project/src/utils");
        let out = run(&mut term, &tree, "ls");
        assert_eq!(out[1].text, "greet.js  math.js");
        run(&mut term, &tree, "cd ../..");
        assert_eq!(term.cwd, "");
        let out = run(&mut term, &tree, "ls");
        assert_eq!(out[1].text, "public/  src/  package.json  README.md");
    }

    #[test]
    fn cd_errors_leave_cwd_unchanged() {
        let tree = sample_project();
        let mut term = Terminal::new(1, "dev");
        run(&mut term, &tree, "cd src");
        let out = run(&mut term, &tree, "cd index.js");
        assert_eq!(out[1].kind, LineKind::Error);
        let out = run(&mut term, &tree, "cd nowhere");
        assert_eq!(out[1].text, "cd: no such file or directory: nowhere");
        assert_eq!(term.cwd, "src");
        run(&mut term, &tree, "cd");
        assert_eq!(term.cwd, "");
    }

    #[test]
    fn cat_prints_file_lines() {
        let tree = sample_project();
        let mut term = Terminal::new(1, "dev");
        let out = run(&mut term, &tree, "cat src/utils/greet.js");
        assert_eq!(out.len(), 4);
        assert_eq!(out[1].text, "export function greet(name) {");
        let out = run(&mut term, &tree, "cat src");
        assert_eq!(out[1], TermLine::error("cat: src: Is a directory"));
    }

    #[test]
    fn clear_empties_scrollback() {
        let tree = sample_project();
        let mut term = Terminal::new(1, "dev");
        run(&mut term, &tree, "echo a");
        run(&mut term, &tree, "clear");
        assert!(term.lines.is_empty());
    }

    #[test]
    fn exit_requests_close() {
        let tree = sample_project();
        let mut term = Terminal::new(1, "dev");
        term.input = "echo hi".to_string();
        assert!(!term.submit(&tree));
        term.input = "exit".to_string();
        assert!(term.submit(&tree));
        let out = run(&mut term, &tree, "help");
        assert!(out.iter().any(|l| l.text.contains("exit")));
    }

    #[test]
    fn history_navigation() {
        let tree = sample_project();
        let mut term = Terminal::new(1, "dev");
        run(&mut term, &tree, "echo one");
        run(&mut term, &tree, "   ");
        run(&mut term, &tree, "pwd");
        assert_eq!(term.history, ["echo one", "pwd"]);

        term.history_prev();
        assert_eq!(term.input, "pwd");
        term.history_prev();
        assert_eq!(term.input, "echo one");
        term.history_prev();
        assert_eq!(term.input, "echo one");
        term.history_next();
        assert_eq!(term.input, "pwd");
        term.history_next();
        assert_eq!(term.input, "");
    }

    #[test]
    fn interrupt_abandons_input() {
        let tree = sample_project();
        let mut term = Terminal::new(1, "dev");
        term.input = "ech".to_string();
        term.interrupt(&tree);
        assert!(term.input.is_empty());
        assert!(term.history.is_empty());
        assert!(term.lines.last().unwrap().text.ends_with("ech^C"));
    }

    #[test]
    fn scrollback_is_capped() {
        let tree = sample_project();
        let mut term = Terminal::new(1, "dev");
        for _ in 0..(MAX_LINES) {
            run(&mut term, &tree, "echo x");
        }
        assert_eq!(term.lines.len(), MAX_LINES);
    }

    #[test]
    fn sessions_create_cycle_close() {
        let mut sessions = TerminalSessions::new();
        let a = sessions.create("dev");
        let b = sessions.create("dev");
        assert_eq!(sessions.active().map(|t| t.id), Some(b));
        sessions.cycle(1);
        assert_eq!(sessions.active().map(|t| t.id), Some(a));
        assert!(sessions.close_active());
        assert_eq!(sessions.active().map(|t| t.id), Some(b));
        assert!(!sessions.close_active());
        assert!(sessions.active().is_none());
    }
}
