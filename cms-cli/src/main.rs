use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use cms_client::models::Post;
use cms_client::CmsClient;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(author, version, about = "Command line client for the CMS API", long_about = None)]
struct Cli {
    /// Server base URL; falls back to CMS_SERVER_URL, then localhost:5000
    #[arg(short, long)]
    server: Option<String>,

    #[arg(long)]
    token_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create an account and store the session token
    Signup {
        #[arg(short, long)]
        username: String,

        #[arg(short, long)]
        email: String,

        #[arg(short, long)]
        password: String,
    },

    /// Sign in and store the session token
    Signin {
        #[arg(short, long)]
        email: String,

        #[arg(short, long)]
        password: String,
    },

    /// Show the stored session token
    Status,

    /// Remove the stored session token
    Logout,

    /// List all posts, newest first
    List,

    /// Show a single post
    Get {
        #[arg(short, long)]
        id: i64,
    },

    /// Search posts by title, content or author name
    Search {
        #[arg(short, long)]
        query: String,
    },

    /// Create a post (requires signin)
    Create {
        #[arg(short, long)]
        title: String,

        #[arg(short, long)]
        content: String,
    },

    /// Delete an owned post (requires signin)
    Delete {
        #[arg(short, long)]
        id: i64,
    },

    /// List uploaded theme images
    Themes,

    /// Upload a theme image (requires signin)
    UploadTheme {
        #[arg(short, long)]
        title: String,

        #[arg(short, long)]
        description: Option<String>,

        #[arg(short, long)]
        file: PathBuf,
    },

    /// Submit a support ticket
    Support {
        #[arg(short, long)]
        name: String,

        #[arg(short, long)]
        email: String,

        #[arg(short, long)]
        subject: String,

        #[arg(short, long)]
        message: String,
    },

    /// List support tickets (requires signin)
    Tickets,
}

struct TokenManager {
    token_path: PathBuf,
}

impl TokenManager {
    fn new(custom_path: Option<PathBuf>) -> Result<Self> {
        let token_path = match custom_path {
            Some(path) => path,
            None => {
                let home = dirs::home_dir().context("Failed to get home directory")?;
                home.join(".cms_token")
            }
        };

        Ok(Self { token_path })
    }

    fn save_token(&self, token: &str) -> Result<()> {
        fs::write(&self.token_path, token)
            .with_context(|| format!("Failed to save token to {:?}", self.token_path))?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let mut perms = fs::metadata(&self.token_path)?.permissions();
            perms.set_mode(0o600);
            fs::set_permissions(&self.token_path, perms)?;
        }

        println!("✓ Token saved to {:?}", self.token_path);
        Ok(())
    }

    fn load_token(&self) -> Result<Option<String>> {
        match fs::read_to_string(&self.token_path) {
            Ok(token) => {
                let token = token.trim().to_string();
                if !token.is_empty() {
                    println!("✓ Token loaded from {:?}", self.token_path);
                    Ok(Some(token))
                } else {
                    Ok(None)
                }
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e).context("Failed to read token file"),
        }
    }

    fn clear_token(&self) -> Result<()> {
        if self.token_path.exists() {
            fs::remove_file(&self.token_path)
                .with_context(|| format!("Failed to remove token file {:?}", self.token_path))?;
            println!("✓ Token file removed");
        } else {
            println!("   No token file to remove");
        }
        Ok(())
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let server = cli
        .server
        .or_else(|| std::env::var("CMS_SERVER_URL").ok())
        .unwrap_or_else(|| "http://localhost:5000".to_string());

    println!("🔌 Connecting to: {}", server);

    let mut client = CmsClient::new(server);

    let token_manager = TokenManager::new(cli.token_file)?;
    if let Some(token) = token_manager.load_token()? {
        client.set_token(token);
        println!("🔑 Authenticated with saved token");
    }

    match &cli.command {
        Commands::Signup {
            username,
            email,
            password,
        } => {
            println!("📝 Signing up: {}", username);

            match client.signup(username, email, password).await {
                Ok(response) => {
                    println!("✅ Signup successful!");
                    println!("   User ID: {}", response.user.id);
                    println!("   Username: {}", response.user.username);
                    println!("   Email: {}", response.user.email);

                    token_manager.save_token(&response.token)?;
                }
                Err(e) => {
                    println!("❌ Signup failed: {}", e);
                    std::process::exit(1);
                }
            }
        }

        Commands::Signin { email, password } => {
            println!("🔑 Signing in as: {}", email);

            match client.signin(email, password).await {
                Ok(response) => {
                    println!("✅ Signin successful!");
                    println!("   User ID: {}", response.user.id);
                    println!("   Username: {}", response.user.username);
                    println!("   Email: {}", response.user.email);

                    token_manager.save_token(&response.token)?;
                }
                Err(e) => {
                    println!("❌ Signin failed: {}", e);
                    std::process::exit(1);
                }
            }
        }

        Commands::Status => match token_manager.load_token()? {
            Some(token) => {
                println!("🔑 Token file: {:?}", token_manager.token_path);
                println!("   Token: {}", truncate(&token, 20));
                println!("   Length: {} characters", token.len());
                println!("   Status: ✅ Active");
                println!("\n   To verify the token, try: cargo run -- tickets");
            }
            None => {
                println!("❌ No token found");
                println!("   Please sign in first: cargo run -- signin --email <email> --password <password>");
            }
        },

        Commands::Logout => {
            token_manager.clear_token()?;
        }

        Commands::List => {
            println!("📋 Listing posts");

            match client.list_posts().await {
                Ok(posts) => {
                    println!("✅ Found {} posts", posts.len());
                    println!();

                    if posts.is_empty() {
                        println!("   No posts found");
                        println!("   Tip: Create your first post: cargo run -- create --title \"My Post\" --content \"Hello\"");
                    } else {
                        print_posts(&posts);
                    }
                }
                Err(e) => {
                    println!("❌ Failed to list posts: {}", e);
                    std::process::exit(1);
                }
            }
        }

        Commands::Get { id } => {
            println!("🔍 Getting post #{}", id);

            match client.get_post(*id).await {
                Ok(post) => {
                    println!("✅ Post retrieved:");
                    println!("   ID: {}", post.id);
                    println!("   Title: {}", post.title);
                    println!("   Content: {}", post.content);
                    println!("   Author: {} (#{})", post.author_name, post.author_id);
                    println!("   Created: {}", post.created_at);
                    println!("   Updated: {}", post.updated_at);
                }
                Err(e) => {
                    if e.is_not_found() {
                        println!("❌ Post #{} not found", id);
                        println!("   Tip: Use 'list' command to see available posts");
                    } else {
                        println!("❌ Error: {}", e);
                    }
                    std::process::exit(1);
                }
            }
        }

        Commands::Search { query } => {
            println!("🔍 Searching posts for \"{}\"", query);

            match client.search_posts(query).await {
                Ok(posts) => {
                    println!("✅ Found {} matching posts", posts.len());
                    println!();

                    if posts.is_empty() {
                        println!("   No posts matched");
                    } else {
                        print_posts(&posts);
                    }
                }
                Err(e) => {
                    println!("❌ Search failed: {}", e);
                    std::process::exit(1);
                }
            }
        }

        Commands::Create { title, content } => {
            println!("📝 Creating new post...");

            match client.create_post(title, content).await {
                Ok(post) => {
                    println!("✅ Post created successfully!");
                    println!("   ID: {}", post.id);
                    println!("   Title: {}", post.title);
                    println!("   Author: {}", post.author_name);
                    println!("   Created: {}", post.created_at);
                }
                Err(e) => {
                    if e.is_unauthorized() {
                        println!("❌ Unauthorized. Please sign in first:");
                        println!("   cargo run -- signin --email <email> --password <password>");
                    } else {
                        println!("❌ Failed to create post: {}", e);
                    }
                    std::process::exit(1);
                }
            }
        }

        Commands::Delete { id } => {
            println!("🗑️ Deleting post #{}", id);

            match client.delete_post(*id).await {
                Ok(message) => {
                    println!("✅ {}", message);
                }
                Err(e) => {
                    if e.is_not_found() {
                        println!("❌ Post #{} not found", id);
                    } else if e.is_forbidden() {
                        println!("❌ Forbidden. Only the author can delete this post");
                    } else if e.is_unauthorized() {
                        println!("❌ Unauthorized. Please sign in first");
                    } else {
                        println!("❌ Failed to delete post: {}", e);
                    }
                    std::process::exit(1);
                }
            }
        }

        Commands::Themes => {
            println!("🎨 Listing theme images");

            match client.list_themes().await {
                Ok(themes) => {
                    println!("✅ Found {} theme images", themes.len());
                    println!();

                    for (i, theme) in themes.iter().enumerate() {
                        println!("   {}. [{}] {}", i + 1, theme.id, theme.title);
                        println!("      URL: {}", theme.image_url);
                        if let Some(description) = &theme.description {
                            println!("      Description: {}", description);
                        }
                        println!();
                    }
                }
                Err(e) => {
                    println!("❌ Failed to list themes: {}", e);
                    std::process::exit(1);
                }
            }
        }

        Commands::UploadTheme {
            title,
            description,
            file,
        } => {
            println!("🎨 Uploading theme image from {:?}", file);

            let data =
                fs::read(file).with_context(|| format!("Failed to read image file {:?}", file))?;
            let file_name = file
                .file_name()
                .and_then(|n| n.to_str())
                .context("Image path has no file name")?
                .to_string();
            let mime_type = mime_for(&file_name);

            match client
                .upload_theme(title, description.clone(), file_name, mime_type, data)
                .await
            {
                Ok(theme) => {
                    println!("✅ Theme image uploaded!");
                    println!("   ID: {}", theme.id);
                    println!("   Title: {}", theme.title);
                    println!("   URL: {}", theme.image_url);
                }
                Err(e) => {
                    if e.is_unauthorized() {
                        println!("❌ Unauthorized. Please sign in first");
                    } else {
                        println!("❌ Upload failed: {}", e);
                    }
                    std::process::exit(1);
                }
            }
        }

        Commands::Support {
            name,
            email,
            subject,
            message,
        } => {
            println!("📨 Submitting support ticket: {}", subject);

            match client.submit_ticket(name, email, subject, message).await {
                Ok(created) => {
                    println!("✅ {}", created.message);
                    println!("   Ticket ID: {}", created.ticket_id);
                }
                Err(e) => {
                    println!("❌ Failed to submit ticket: {}", e);
                    std::process::exit(1);
                }
            }
        }

        Commands::Tickets => {
            println!("📋 Listing support tickets");

            match client.list_tickets().await {
                Ok(tickets) => {
                    println!("✅ Found {} tickets", tickets.len());
                    println!();

                    for ticket in &tickets {
                        println!("   [{}] {} ({})", ticket.id, ticket.subject, ticket.status);
                        println!("      From: {} <{}>", ticket.name, ticket.email);
                        println!("      Message: {}", truncate(&ticket.message, 50));
                        println!("      Created: {}", ticket.created_at);
                        println!();
                    }
                }
                Err(e) => {
                    if e.is_unauthorized() {
                        println!("❌ Unauthorized. Please sign in first");
                    } else {
                        println!("❌ Failed to list tickets: {}", e);
                    }
                    std::process::exit(1);
                }
            }
        }
    }

    Ok(())
}

fn print_posts(posts: &[Post]) {
    for (i, post) in posts.iter().enumerate() {
        println!("   {}. [{}] {} (by {})", i + 1, post.id, post.title, post.author_name);
        println!("      Created: {}", post.created_at);
        println!("      Content: {}", truncate(&post.content, 50));
        println!();
    }
}

/// MIME type by file extension. The server checks both the extension and the
/// MIME, so unknown files go out as octet-stream and get rejected there.
fn mime_for(file_name: &str) -> &'static str {
    match Path::new(file_name)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .as_deref()
    {
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("png") => "image/png",
        Some("gif") => "image/gif",
        Some("webp") => "image/webp",
        _ => "application/octet-stream",
    }
}

fn truncate(s: &str, max_len: usize) -> String {
    if s.len() <= max_len {
        s.to_string()
    } else {
        format!("{}...", &s[..max_len])
    }
}
