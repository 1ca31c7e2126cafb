use dummy_client::config::{Credentials, Settings};
use testcontainers::{
    clients::Cli,
    core::WaitFor,
    Container, GenericImage,
};
use tokio::sync::OnceCell;

static DOCKER: OnceCell<Cli> = OnceCell::const_new();

pub const USERNAME: &str = "guest";
pub const PASSWORD: &str = "guest";

pub async fn setup_activemq_artemis() -> (Container<'static, GenericImage>, u16) {
    let docker = DOCKER.get_or_init(|| async { Cli::default() }).await;
    let image = GenericImage::new("docker.io/vromero/activemq-artemis", "latest")
        .with_env_var("ARTEMIS_USERNAME", USERNAME)
        .with_env_var("ARTEMIS_PASSWORD", PASSWORD)
        .with_exposed_port(5672)
        .with_wait_for(WaitFor::seconds(5));
    let node = docker.run(image);

    let port = node.get_host_port_ipv4(5672);
    (node, port)
}

/// Settings pointing both sides at the container with PLAIN credentials
pub fn settings(port: u16, queue: &str) -> Settings {
    let credentials = Credentials {
        username: USERNAME.into(),
        password: PASSWORD.into(),
    };
    Settings {
        port,
        sender: credentials.clone(),
        receiver: credentials,
        send_queue: queue.into(),
        receive_queue: queue.into(),
        ..Default::default()
    }
}
