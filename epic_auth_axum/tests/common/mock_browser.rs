use reqwest::{Client, Response, StatusCode, Url, cookie::Jar, header::LOCATION, redirect::Policy};
use std::sync::Arc;

const MAX_REDIRECTS: usize = 10;

/// Mock browser client for integration testing
///
/// Keeps cookies in a jar and follows redirects itself so every hop goes
/// through the jar, the way a browser would.
pub struct MockBrowser {
    client: Client,
    jar: Arc<Jar>,
    base_url: Url,
}

/// A rendered page after all redirects were followed
#[derive(Debug)]
pub struct Page {
    /// Path and query of the final url
    pub path: String,
    pub status: StatusCode,
    pub body: String,
}

impl MockBrowser {
    pub fn new(base_url: &str) -> Self {
        let jar = Arc::new(Jar::default());
        let client = Client::builder()
            .redirect(Policy::none())
            .cookie_provider(jar.clone())
            .build()
            .expect("http client");

        Self {
            client,
            jar,
            base_url: Url::parse(base_url).expect("base url"),
        }
    }

    /// Put a cookie in the jar as if the server had set it
    pub fn add_cookie(&self, name: &str, value: &str) {
        self.jar.add_cookie_str(
            &format!("{name}={value}; Path=/; HttpOnly; SameSite=Lax"),
            &self.base_url,
        );
    }

    pub async fn goto(&self, path: &str) -> Page {
        let response = self
            .client
            .get(self.url(path))
            .send()
            .await
            .expect("GET request");
        self.follow(response).await
    }

    /// Submit a form and follow the resulting redirects
    pub async fn submit(&self, path: &str, form: &[(&str, &str)]) -> Page {
        let response = self.post_form(path, form).await;
        self.follow(response).await
    }

    /// Submit a form without following redirects
    pub async fn post_form(&self, path: &str, form: &[(&str, &str)]) -> Response {
        self.client
            .post(self.url(path))
            .form(form)
            .send()
            .await
            .expect("POST request")
    }

    fn url(&self, path: &str) -> Url {
        self.base_url.join(path).expect("request url")
    }

    async fn follow(&self, mut response: Response) -> Page {
        for _ in 0..MAX_REDIRECTS {
            if !response.status().is_redirection() {
                break;
            }
            let location = response
                .headers()
                .get(LOCATION)
                .and_then(|v| v.to_str().ok())
                .expect("redirect without location")
                .to_string();
            let next = response.url().join(&location).expect("redirect url");
            response = self.client.get(next).send().await.expect("follow redirect");
        }

        let url = response.url().clone();
        let path = match url.query() {
            Some(query) => format!("{}?{}", url.path(), query),
            None => url.path().to_string(),
        };
        let status = response.status();
        let body = response.text().await.expect("response body");
        Page { path, status, body }
    }
}

impl Page {
    pub fn contains(&self, text: &str) -> bool {
        self.body.contains(text)
    }

    pub fn has_link(&self, text: &str) -> bool {
        self.body.contains(&format!(">{text}</a>"))
    }

    pub fn has_button(&self, text: &str) -> bool {
        self.body.contains(&format!(">{text}</button>"))
    }

    /// Text of the first `<h1>`
    pub fn heading(&self) -> Option<String> {
        let start = self.body.find("<h1>")? + "<h1>".len();
        let end = self.body[start..].find("</h1>")? + start;
        Some(unescape_html(self.body[start..end].trim()))
    }

    /// Text content of the element with the given id
    pub fn text_of(&self, id: &str) -> Option<String> {
        let marker = format!("id=\"{id}\"");
        let tag = self.body.find(&marker)?;
        let start = self.body[tag..].find('>')? + tag + 1;
        let end = self.body[start..].find('<')? + start;
        Some(unescape_html(self.body[start..end].trim()))
    }
}

fn unescape_html(text: &str) -> String {
    text.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&#34;", "\"")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&#x27;", "'")
        .replace("&amp;", "&")
}
