/// A wire-format request used as benchmark input.
#[derive(Debug, Copy, Clone)]
pub struct Fixture {
    name: &'static str,
    group: FixtureGroup,
    content: &'static str,
}

impl Fixture {
    pub const fn new(name: &'static str, group: FixtureGroup, content: &'static str) -> Self {
        Self { name, group, content }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn group(&self) -> FixtureGroup {
        self.group
    }

    pub fn content(&self) -> &'static str {
        self.content
    }

    pub fn len(&self) -> usize {
        self.content.len()
    }

    pub fn is_empty(&self) -> bool {
        self.content.is_empty()
    }
}

#[derive(Clone, Copy, Debug)]
pub enum FixtureGroup {
    Get,
    Form,
    Multipart,
}

pub static GET_SMALL: Fixture = Fixture::new(
    "get_small",
    FixtureGroup::Get,
    "GET /test/cool HTTP/1.1\r\nHost: 127.0.0.1:8080\r\nUser-Agent: curl/8.5.0\r\nAccept: */*\r\n\r\n",
);

pub static GET_LARGE: Fixture = Fixture::new(
    "get_large",
    FixtureGroup::Get,
    concat!(
        "GET /api/users/search?name=John%20Doe&city=San+Francisco&page=3&sort=desc HTTP/1.1\r\n",
        "Host: backend.example.com\r\n",
        "User-Agent: Mozilla/5.0 (X11; Linux x86_64; rv:128.0) Gecko/20100101 Firefox/128.0\r\n",
        "Accept: text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8\r\n",
        "Accept-Language: en-US,en;q=0.5\r\n",
        "Accept-Encoding: gzip, deflate, br\r\n",
        "Referer: https://backend.example.com/api/users\r\n",
        "Cookie: session=4f8a9c2e7b1d3f6a; theme=dark; lang=en\r\n",
        "Cache-Control: no-cache\r\n",
        "Pragma: no-cache\r\n",
        "Sec-Fetch-Dest: document\r\n",
        "Sec-Fetch-Mode: navigate\r\n",
        "Sec-Fetch-Site: same-origin\r\n",
        "Connection: keep-alive\r\n",
        "\r\n",
    ),
);

pub static FORM_POST: Fixture = Fixture::new(
    "form_post",
    FixtureGroup::Form,
    concat!(
        "POST /test/user HTTP/1.1\r\n",
        "Host: 127.0.0.1:8080\r\n",
        "Content-Type: application/x-www-form-urlencoded\r\n",
        "Content-Length: 52\r\n",
        "\r\n",
        "name=John+Doe&age=42&city=San%20Francisco&note=a%26b",
    ),
);

pub static MULTIPART_POST: Fixture = Fixture::new(
    "multipart_post",
    FixtureGroup::Multipart,
    concat!(
        "POST /test/user HTTP/1.1\r\n",
        "Host: 127.0.0.1:8080\r\n",
        "Content-Type: multipart/form-data; boundary=XyZ\r\n",
        "Content-Length: 130\r\n",
        "\r\n",
        "--XyZ\r\n",
        "Content-Disposition: form-data; name=\"name\"\r\n",
        "\r\n",
        "John Doe\r\n",
        "--XyZ\r\n",
        "Content-Disposition: form-data; name=\"age\"\r\n",
        "\r\n",
        "42\r\n",
        "--XyZ--\r\n",
    ),
);

pub fn fixtures() -> [Fixture; 4] {
    [GET_SMALL, GET_LARGE, FORM_POST, MULTIPART_POST]
}
