use blogicum_client::models::{Page, PostInput, PostView, ProfileInput};
use blogicum_client::{BlogClient, BlogClientError};
use chrono::{DateTime, Utc};
use clap::{Args, Parser};
use uuid::Uuid;

#[derive(Parser, Debug)]
struct Cli {
    #[clap(short, long, default_value = "http://127.0.0.1:8080")]
    server: String,

    #[clap(subcommand)]
    command: Command,
}

#[derive(Args, Debug)]
struct PostFields {
    #[clap(long)]
    title: Option<String>,
    #[clap(long)]
    text: Option<String>,
    /// RFC 3339, e.g. 2024-06-01T10:00:00Z
    #[clap(long)]
    pub_date: Option<DateTime<Utc>>,
    #[clap(long)]
    draft: bool,
    #[clap(long, conflicts_with = "draft")]
    publish: bool,
    #[clap(long)]
    category: Option<Uuid>,
    #[clap(long)]
    location: Option<Uuid>,
    #[clap(long)]
    image: Option<String>,
}

#[derive(Parser, Debug)]
enum Command {
    Register {
        #[clap(long)]
        username: String,
        #[clap(long)]
        email: String,
        #[clap(long)]
        password: String,
    },
    Login {
        #[clap(long)]
        username: String,
        #[clap(long)]
        password: String,
    },
    Logout,
    Health,
    ListPosts {
        #[clap(long)]
        page: Option<u32>,
    },
    Category {
        slug: String,
        #[clap(long)]
        page: Option<u32>,
    },
    GetPost {
        id: Uuid,
    },
    CreatePost {
        #[clap(flatten)]
        fields: PostFields,
    },
    UpdatePost {
        id: Uuid,
        #[clap(flatten)]
        fields: PostFields,
    },
    DeletePost {
        id: Uuid,
    },
    Comment {
        post_id: Uuid,
        #[clap(long)]
        text: String,
    },
    EditComment {
        post_id: Uuid,
        comment_id: Uuid,
        #[clap(long)]
        text: String,
    },
    DeleteComment {
        post_id: Uuid,
        comment_id: Uuid,
    },
    Profile {
        username: String,
        #[clap(long)]
        page: Option<u32>,
    },
    Me,
    EditProfile {
        #[clap(long)]
        username: Option<String>,
        #[clap(long)]
        email: Option<String>,
        #[clap(long)]
        first_name: Option<String>,
        #[clap(long)]
        last_name: Option<String>,
    },
}

fn print_page(page: &Page<PostView>) {
    println!(
        "Page {} of {} ({} posts)",
        page.number, page.num_pages, page.total
    );
    for post in &page.items {
        println!("- {post}");
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Cli::parse();
    let mut client = BlogClient::connect(&args.server)?;

    match run(&mut client, args.command).await {
        Err(BlogClientError::Redirected { location }) => {
            eprintln!("Only the author can do that. Nothing was changed; see {location}");
            std::process::exit(2);
        }
        other => other?,
    }

    Ok(())
}

async fn run(client: &mut BlogClient, command: Command) -> Result<(), BlogClientError> {
    match command {
        Command::Register {
            username,
            email,
            password,
        } => {
            client.register(username, email, password).await?;
            println!("Successfully registered!");
        }
        Command::Login { username, password } => {
            client.login(username, password).await?;
            println!("Successfully logged in!");
        }
        Command::Logout => {
            client.logout()?;
            println!("Logged out");
        }
        Command::Health => {
            let health = client.health().await?;
            println!("{} at {}", health.status, health.timestamp);
        }
        Command::ListPosts { page } => {
            print_page(&client.list_posts(page).await?);
        }
        Command::Category { slug, page } => {
            let listing = client.category_posts(&slug, page).await?;
            println!("{}: {}", listing.category.title, listing.category.description);
            print_page(&listing.page);
        }
        Command::GetPost { id } => {
            let detail = client.get_post(id).await?;
            println!("{}\n\n{}\n", detail.post, detail.post.text);
            for comment in detail.comments {
                println!(
                    "  [{}] {}: {}",
                    comment.id, comment.author.username, comment.text
                );
            }
        }
        Command::CreatePost { fields } => {
            let input = PostInput {
                title: fields.title.unwrap_or_default(),
                text: fields.text.unwrap_or_default(),
                pub_date: fields.pub_date.unwrap_or_else(Utc::now),
                is_published: !fields.draft,
                location_id: fields.location,
                category_id: fields.category,
                image: fields.image,
            };
            let post = client.create_post(&input).await?;
            println!("Post created! ID: {}", post.id);
        }
        Command::UpdatePost { id, fields } => {
            // prefill from the current post like the edit form does
            let current = client.edit_post_form(id).await?;
            let input = PostInput {
                title: fields.title.unwrap_or(current.title),
                text: fields.text.unwrap_or(current.text),
                pub_date: fields.pub_date.unwrap_or(current.pub_date),
                is_published: match (fields.draft, fields.publish) {
                    (true, _) => false,
                    (_, true) => true,
                    _ => current.is_published,
                },
                location_id: fields.location.or(current.location_id),
                category_id: fields.category.or(current.category_id),
                image: fields.image.or(current.image),
            };
            let post = client.update_post(id, &input).await?;
            println!("Post updated: {}", post.title);
        }
        Command::DeletePost { id } => {
            client.delete_post(id).await?;
            println!("Post deleted!");
        }
        Command::Comment { post_id, text } => {
            let comment = client.add_comment(post_id, text).await?;
            println!("Comment added! ID: {}", comment.id);
        }
        Command::EditComment {
            post_id,
            comment_id,
            text,
        } => {
            let comment = client.update_comment(post_id, comment_id, text).await?;
            println!("Comment updated: {}", comment.text);
        }
        Command::DeleteComment {
            post_id,
            comment_id,
        } => {
            client.delete_comment(post_id, comment_id).await?;
            println!("Comment deleted!");
        }
        Command::Profile { username, page } => {
            let profile = client.profile(&username, page).await?;
            println!(
                "{} ({} {}), joined {}",
                profile.profile.username,
                profile.profile.first_name,
                profile.profile.last_name,
                profile.profile.date_joined.format("%Y-%m-%d")
            );
            print_page(&profile.page);
        }
        Command::Me => {
            let me = client.me().await?;
            println!("{} <{}> {} {}", me.username, me.email, me.first_name, me.last_name);
        }
        Command::EditProfile {
            username,
            email,
            first_name,
            last_name,
        } => {
            let current = client.me().await?;
            let input = ProfileInput {
                username: username.unwrap_or(current.username),
                email: email.unwrap_or(current.email),
                first_name: first_name.unwrap_or(current.first_name),
                last_name: last_name.unwrap_or(current.last_name),
            };
            let me = client.update_profile(&input).await?;
            println!("Profile updated: {}", me.username);
        }
    }

    Ok(())
}
