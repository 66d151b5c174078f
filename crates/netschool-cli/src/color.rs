use clap::ValueEnum;

/// Whether output and error reports are colored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, ValueEnum)]
pub enum Color {
    /// Never
    No,
    /// Always
    Yes,
    /// When stdout is a terminal that supports it
    Auto,
}

impl Color {
    /// Resolves [`Color::Auto`] against the terminal.
    pub fn is_enabled(self) -> bool {
        match self {
            Color::No => false,
            Color::Yes => true,
            Color::Auto => supports_color::on(supports_color::Stream::Stdout).is_some(),
        }
    }
}

/// Installs the `color-eyre` report handler, without colors unless `color` is enabled.
pub fn install_color_eyre(color: Color) -> color_eyre::Result<(), color_eyre::Report> {
    if color.is_enabled() {
        color_eyre::install()
    } else {
        // An empty theme disables error coloring
        color_eyre::config::HookBuilder::new()
            .theme(color_eyre::config::Theme::new())
            .install()
    }
}
