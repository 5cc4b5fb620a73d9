//! Session commands: login, logout, whoami, department.

use anyhow::{Context, Result};

use marksheet::{Role, Session, SessionStore};

pub fn login_command(
    email: String,
    role: &str,
    token: String,
    department_id: Option<u64>,
    department_name: Option<String>,
) -> Result<()> {
    let role: Role = role.parse()?;
    let session = Session::new(email, role, token).with_department(department_id, department_name);

    let store = SessionStore::global();
    store
        .login(&session)
        .with_context(|| format!("Failed to save session to {}", store.path().display()))?;

    println!("Logged in as {} ({})", session.email, session.role);
    Ok(())
}

pub fn logout_command() -> Result<()> {
    if SessionStore::global().logout()? {
        println!("Logged out");
    } else {
        println!("Not logged in");
    }
    Ok(())
}

pub fn whoami_command(json: bool) -> Result<()> {
    let session = SessionStore::global().require()?;

    if json {
        // Never print the token
        let value = serde_json::json!({
            "email": session.email,
            "role": session.role,
            "departmentId": session.department_id,
            "departmentName": session.department_name,
            "loggedInAt": session.logged_in_at,
        });
        println!("{}", serde_json::to_string_pretty(&value)?);
        return Ok(());
    }

    println!("{} ({})", session.email, session.role);
    if let Some(name) = &session.department_name {
        println!("  Department: {}", name);
    }
    println!(
        "  Logged in:  {}",
        session.logged_in_at.format("%Y-%m-%d %H:%M:%S UTC")
    );
    Ok(())
}

pub fn department_command(id: Option<u64>, name: Option<String>) -> Result<()> {
    let session = SessionStore::global().set_department(id, name)?;
    match &session.department_name {
        Some(name) => println!("Department set to {}", name),
        None => println!("Department cleared"),
    }
    Ok(())
}
