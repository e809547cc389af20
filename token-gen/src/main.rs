use clap::Parser;
use jsonwebtoken::{Algorithm, EncodingKey, Header, encode};
use serde_json::{Map, Value, json};

/// Mint an HS256 session token accepted by the API's NextAuth strategy.
///
/// - Signs `{sub, iat, exp}` with the shared secret (NEXTAUTH_SECRET)
/// - `--user-id` puts the identity under `user.id` instead of `sub`
/// - `--expired` backdates `exp` to exercise the expiry path
#[derive(Parser, Debug)]
#[command(name = "token-gen", version, about)]
struct Args {
    /// Shared secret; falls back to NEXTAUTH_SECRET
    #[arg(long, env = "NEXTAUTH_SECRET", hide_env_values = true)]
    secret: String,

    /// User identifier placed in the token
    #[arg(long)]
    sub: String,

    /// Lifetime in seconds
    #[arg(long, default_value_t = 3600)]
    ttl_seconds: i64,

    /// Emit the identifier as nested `user.id` (no `sub` claim)
    #[arg(long, default_value_t = false)]
    user_id: bool,

    /// Issue an already-expired token
    #[arg(long, default_value_t = false)]
    expired: bool,

    /// Print only the token (no extra lines)
    #[arg(long, default_value_t = false)]
    quiet: bool,
}

fn claims(args: &Args, now: i64) -> Value {
    let exp = if args.expired {
        now - args.ttl_seconds.max(1)
    } else {
        now + args.ttl_seconds
    };

    let mut claims = Map::new();
    if args.user_id {
        claims.insert("user".to_string(), json!({ "id": args.sub }));
    } else {
        claims.insert("sub".to_string(), Value::String(args.sub.clone()));
    }
    claims.insert("iat".to_string(), json!(now));
    claims.insert("exp".to_string(), json!(exp));

    Value::Object(claims)
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    if args.secret.is_empty() {
        return Err("secret must not be empty".into());
    }

    let now = chrono::Utc::now().timestamp();
    let payload = claims(&args, now);

    let token = encode(
        &Header::new(Algorithm::HS256),
        &payload,
        &EncodingKey::from_secret(args.secret.as_bytes()),
    )?;

    if args.quiet {
        println!("{token}");
        return Ok(());
    }

    println!("token: {token}");
    println!("claims: {payload}");
    println!("Authorization: Bearer {token}");

    Ok(())
}
