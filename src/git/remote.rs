//! Repository coordinates parsed from a remote URL.

use url::Url;

/// Host and path of a hosted repository (e.g. `github.com`, `acme`, `tool`)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepoCoordinates {
    pub host: String,
    /// Everything before the last path segment; nested GitLab groups stay joined by `/`
    pub owner: String,
    pub name: String,
    /// Scheme, host and port of the web interface (`https://host` for ssh remotes)
    pub web_origin: String,
}

impl RepoCoordinates {
    /// `owner/name`
    pub fn path(&self) -> String {
        format!("{}/{}", self.owner, self.name)
    }

    /// Web page of the repository
    pub fn web_url(&self) -> String {
        format!("{}/{}", self.web_origin, self.path())
    }

    /// Parse `git@host:owner/repo.git`, `ssh://git@host[:port]/owner/repo.git`
    /// or `https://host/owner/repo[.git]`.
    pub fn parse(remote: &str) -> Option<Self> {
        let remote = remote.trim();

        let (host, path, web_origin) = if remote.contains("://") {
            let url = Url::parse(remote).ok()?;
            let host = url.host_str()?.to_string();
            // An ssh port says nothing about the web interface
            let web_origin = match url.scheme() {
                "http" | "https" => url.origin().ascii_serialization(),
                _ => format!("https://{}", host),
            };
            (host, url.path().to_string(), web_origin)
        } else {
            // scp-like syntax
            let (user_host, path) = remote.split_once(':')?;
            let host = user_host.rsplit('@').next()?;
            (host.to_string(), path.to_string(), format!("https://{}", host))
        };

        let path = path.trim_matches('/');
        let path = path.strip_suffix(".git").unwrap_or(path);
        let (owner, name) = path.rsplit_once('/')?;
        if owner.is_empty() || name.is_empty() || host.is_empty() {
            return None;
        }

        Some(RepoCoordinates {
            host,
            owner: owner.to_string(),
            name: name.to_string(),
            web_origin,
        })
    }
}
