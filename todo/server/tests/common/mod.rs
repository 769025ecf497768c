use testcontainers_modules::mongo;
use testcontainers_modules::testcontainers::ContainerAsync;
use testcontainers_modules::testcontainers::runners::AsyncRunner;
use todo_server::config::Config;
use todo_server::todo::repository::MongoTodoRepository;

pub async fn setup_container() -> anyhow::Result<ContainerAsync<mongo::Mongo>> {
    let container = mongo::Mongo::default().start().await?;
    Ok(container)
}

pub async fn setup_config(container: &ContainerAsync<mongo::Mongo>) -> anyhow::Result<Config> {
    let host = container.get_host().await?;
    let port = container.get_host_port_ipv4(27017).await?;
    Ok(Config {
        db_url: format!("mongodb://{}:{}", host, port),
        ..Config::default()
    })
}

pub async fn setup_repository(
    container: &ContainerAsync<mongo::Mongo>,
) -> anyhow::Result<MongoTodoRepository> {
    let config = setup_config(container).await?;
    let repository = MongoTodoRepository::connect(&config).await?;
    Ok(repository)
}
