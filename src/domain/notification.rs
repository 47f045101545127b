use crate::domain::ownership::SigRecord;
use crate::error::EffectFailures;

/// Forge limit on label name length, in characters.
pub const MAX_LABEL_LEN: usize = 20;

/// `sig/<name>`, cut to the forge's label length limit.
pub fn sig_label(sig_name: &str) -> String {
    format!("sig/{sig_name}").chars().take(MAX_LABEL_LEN).collect()
}

/// Fixed parts of every welcome comment.
#[derive(Debug, Clone)]
pub struct WelcomeContext<'a> {
    pub author: &'a str,
    pub community_name: &'a str,
    pub command_link: &'a str,
    pub sig_name: &'a str,
    /// Browsable location of the SIG's directory in the community repository.
    pub sig_url: &'a str,
}

/// Who the comment points the author to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Roster {
    Maintainers(Vec<String>),
    MaintainersAndCommitters {
        maintainers: Vec<String>,
        committers: Vec<String>,
    },
}

impl Roster {
    pub fn from_record(record: &SigRecord) -> Self {
        let maintainers = record.maintainers.iter().cloned().collect();
        if record.committers.is_empty() {
            Roster::Maintainers(maintainers)
        } else {
            Roster::MaintainersAndCommitters {
                maintainers,
                committers: record.committers.iter().cloned().collect(),
            }
        }
    }

    pub fn render(&self, ctx: &WelcomeContext<'_>) -> String {
        let greeting = format!(
            "Hi ***{author}***, welcome to the {community} Community.\n\
             I'm the Bot here serving you. You can find the instructions on how to interact with me at **[Here]({link})**.\n\
             If you have any questions, please contact the SIG: [{sig}]({sig_url}), and any of the maintainers: {maintainers}",
            author = ctx.author,
            community = ctx.community_name,
            link = ctx.command_link,
            sig = ctx.sig_name,
            sig_url = ctx.sig_url,
            maintainers = mention_list(self.maintainers()),
        );

        match self {
            Roster::Maintainers(_) => greeting,
            Roster::MaintainersAndCommitters { committers, .. } => {
                format!("{greeting}, any of the committers: {}", mention_list(committers))
            }
        }
    }

    fn maintainers(&self) -> &[String] {
        match self {
            Roster::Maintainers(maintainers) => maintainers,
            Roster::MaintainersAndCommitters { maintainers, .. } => maintainers,
        }
    }
}

fn mention_list(logins: &[String]) -> String {
    logins
        .iter()
        .map(|login| format!("**@{login}**"))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Comment for a pull request that introduces OBS packages not yet present
/// in the OBS meta repository.
pub fn obs_meta_message(meta_file: &str, community_name: &str, guide_url: &str) -> String {
    format!(
        "Since you have added a item to the {meta_file} file, we will automatically generate a default package in project {community_name}:Factory on OBS cluster for you.\n\
         If you need a more customized configuration, you can configure it according to the following [instructions]({guide_url})"
    )
}

/// What a single welcome handling produced.
#[derive(Debug)]
pub struct NotificationOutcome {
    pub label_name: String,
    pub comment_body: String,
    pub errors: EffectFailures,
}
