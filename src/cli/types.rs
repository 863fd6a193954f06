use clap::Subcommand;

#[derive(Subcommand, Debug, Clone)]
pub enum WidgetArgs {
    /// List configured widgets.
    List {},
    /// Run a widget's query and print the matching notes.
    Run {
        /// Widget title (case-insensitive)
        title: String,
    },
}
