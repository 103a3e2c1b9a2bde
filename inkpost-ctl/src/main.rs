use std::sync::Arc;

use anyhow::Context;
use inkpost_client::{
    api::{AuthToken, CommentApi, CommentId, Credentials},
    Action, ActionState, ClientConfig, Dispatch, Forest, HttpApi, Parent, SectionHandle, Viewer,
};

#[derive(structopt::StructOpt)]
struct Opt {
    #[structopt(short, long)]
    host: String,

    #[structopt(subcommand)]
    cmd: Command,
}

#[derive(structopt::StructOpt)]
enum Command {
    /// Sign in and print an access token to put in INKPOST_TOKEN
    Login { email: String, password: String },

    /// Print the comments of an article
    Show { slug: String },

    /// Comment on an article
    Comment { slug: String, content: String },

    /// Reply to a comment
    Reply {
        slug: String,
        parent: i64,
        content: String,
    },

    /// Replace the content of one of your comments
    Edit {
        slug: String,
        id: i64,
        content: String,
    },

    /// Delete one of your comments, with its replies
    Delete { slug: String, id: i64 },

    /// Like a comment, or unlike it if already liked
    Like { slug: String, id: i64 },
}

async fn viewer(api: &HttpApi) -> anyhow::Result<Option<Viewer>> {
    let token = match std::env::var("INKPOST_TOKEN") {
        Ok(t) => AuthToken(t),
        Err(std::env::VarError::NotPresent) => return Ok(None),
        Err(e) => return Err(e).context("retrieving INKPOST_TOKEN environment variable"),
    };
    let user = api
        .whoami(&token)
        .await
        .context("checking the token from INKPOST_TOKEN")?;
    Ok(Some(Viewer {
        user: user.id,
        token,
    }))
}

fn print_forest(forest: &Forest, depth: usize) {
    for c in forest.iter() {
        let liked = if c.liked { ", liked" } else { "" };
        println!(
            "{:indent$}#{} {} ({} likes{liked})",
            "",
            c.id.0,
            c.author.display_name,
            c.total_likes,
            indent = depth * 2,
        );
        for line in c.content.lines() {
            println!("{:indent$}  {line}", "", indent = depth * 2);
        }
        print_forest(&c.replies, depth + 1);
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    let opt = <Opt as structopt::StructOpt>::from_args();
    let http = HttpApi::new(ClientConfig {
        host: opt.host.clone(),
    });
    let media_host = String::from(http.host());

    let (slug, action) = match opt.cmd {
        Command::Login { email, password } => {
            let tokens = http
                .login(Credentials { email, password })
                .await
                .context("signing in")?;
            println!("{}", tokens.access.0);
            return Ok(());
        }
        Command::Show { slug } => (slug, None),
        Command::Comment { slug, content } => (
            slug,
            Some(Action::Create {
                parent: Parent::Root,
                content,
            }),
        ),
        Command::Reply {
            slug,
            parent,
            content,
        } => (
            slug,
            Some(Action::Create {
                parent: Parent::Comment(CommentId(parent)),
                content,
            }),
        ),
        Command::Edit { slug, id, content } => (
            slug,
            Some(Action::Edit {
                id: CommentId(id),
                content,
            }),
        ),
        Command::Delete { slug, id } => (slug, Some(Action::Delete { id: CommentId(id) })),
        Command::Like { slug, id } => (slug, Some(Action::Like { id: CommentId(id) })),
    };

    let viewer = viewer(&http).await?;
    let api: Arc<dyn CommentApi> = Arc::new(http);
    let section = SectionHandle::load(api, viewer.as_ref(), &slug, &media_host)
        .await
        .with_context(|| format!("loading comments of {slug:?}"))?;

    if let Some(action) = action {
        let dispatch = match action {
            Action::Delete { id } => {
                section.with(|s| s.request_delete(id));
                section.confirm_delete(viewer.as_ref())
            }
            action => section.submit(viewer.as_ref(), action),
        };
        match dispatch {
            Dispatch::SignInRequested => {
                anyhow::bail!("signing in is required, set INKPOST_TOKEN (see the login command)")
            }
            Dispatch::Ignored => tracing::info!("empty comment, nothing to send"),
            Dispatch::Invalid(e) => return Err(e).context("checking comment content"),
            Dispatch::Pending(done) => {
                if done.await != Some(ActionState::Applied) {
                    anyhow::bail!(section
                        .error()
                        .unwrap_or_else(|| String::from("comment action failed")));
                }
            }
        }
    }

    print_forest(&section.forest(), 0);
    Ok(())
}
