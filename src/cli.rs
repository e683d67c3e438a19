use clap::{Parser, Subcommand};
use gilt::types::PartialRepositoryId;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[clap(author, version, about)]
pub struct Cli {
    #[clap(subcommand)]
    pub cmd: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Store GitHub credentials in the config file.
    Login {
        /// GitHub username.
        username: String,
        /// Personal access token.
        token: String,
    },
    /// Repository related operations.
    Repos {
        #[clap(subcommand)]
        cmd: self::repos::Command,
    },
    /// Issue related operations.
    Issues {
        #[clap(subcommand)]
        cmd: self::issues::Command,
    },
    /// Discussion related operations.
    Discussions {
        #[clap(subcommand)]
        cmd: self::discussions::Command,
    },
    /// Print statistics of a repository.
    Stats {
        /// Repository identifier.
        repo: PartialRepositoryId,
    },
    /// Wiki related operations.
    Wiki {
        #[clap(subcommand)]
        cmd: self::wiki::Command,
    },
}

pub mod repos {
    use super::*;

    #[derive(Subcommand, Debug)]
    pub enum Command {
        /// Print list of owned repositories.
        Ls {},
    }
}

pub mod issues {
    use super::*;

    #[derive(Subcommand, Debug)]
    pub enum Command {
        /// Print issues. Without a repository, aggregates issues across every
        /// owned repository.
        Ls {
            /// Repository identifier.
            repo: Option<PartialRepositoryId>,
        },
        /// Create an issue.
        Create {
            /// Repository identifier.
            repo: PartialRepositoryId,

            /// Issue title.
            title: String,

            /// Issue body.
            #[clap(long)]
            body: Option<String>,
        },
        /// Close an issue.
        Close {
            /// Repository identifier.
            repo: PartialRepositoryId,

            /// Issue number.
            number: i64,
        },
        /// Reopen a closed issue.
        Reopen {
            /// Repository identifier.
            repo: PartialRepositoryId,

            /// Issue number.
            number: i64,
        },
        /// Print comments of an issue.
        Comments {
            /// Repository identifier.
            repo: PartialRepositoryId,

            /// Issue number.
            number: i64,
        },
        /// Post a comment on an issue.
        Comment {
            /// Repository identifier.
            repo: PartialRepositoryId,

            /// Issue number.
            number: i64,

            /// Comment body.
            body: String,
        },
    }
}

pub mod discussions {
    use super::*;

    #[derive(Subcommand, Debug)]
    pub enum Command {
        /// Print recent discussions of a repository.
        Ls {
            /// Repository identifier.
            repo: PartialRepositoryId,
        },
    }
}

pub mod wiki {
    use super::*;

    #[derive(Subcommand, Debug)]
    pub enum Command {
        /// Print wiki pages of a repository.
        Ls {
            /// Repository identifier.
            repo: PartialRepositoryId,
        },
        /// Print image assets at the repository root.
        Assets {
            /// Repository identifier.
            repo: PartialRepositoryId,
        },
        /// Publish a wiki page from a file or from the saved draft.
        Push {
            /// Repository identifier.
            repo: PartialRepositoryId,

            /// Page title.
            title: String,

            /// Read content from this file instead of the saved draft.
            #[clap(long)]
            file: Option<PathBuf>,
        },
        /// Local draft operations.
        Drafts {
            #[clap(subcommand)]
            cmd: self::drafts::Command,
        },
    }

    pub mod drafts {
        use super::*;

        #[derive(Subcommand, Debug)]
        pub enum Command {
            /// Print saved drafts.
            Ls {},

            /// Save a file as the draft of a page.
            Save {
                /// Page title.
                title: String,

                /// Draft content file.
                file: PathBuf,
            },

            /// Print the draft of a page.
            Show {
                /// Page title.
                title: String,
            },

            /// Discard the draft of a page.
            Discard {
                /// Page title.
                title: String,
            },
        }
    }
}

pub fn cmd() -> Cli {
    Cli::parse()
}
