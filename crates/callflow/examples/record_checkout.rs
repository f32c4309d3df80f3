use callflow::core::{CallIdGenerator, Container, Renderer};
use callflow::plugins::mermaid::MermaidRenderer;
use callflow::plugins::plantuml::PlantUmlRenderer;
use callflow::plugins::recorder::Recorder;

fn main() {
    let recorder = Recorder::new(CallIdGenerator::new());
    let user = Container::person("shop", "user");
    let web = Container::system("shop", "web");
    let orders = Container::database("data", "orders");

    let placed: Result<u64, String> = recorder.traced(&user, &web, "checkout", vec![], || {
        let id: Result<u64, String> =
            recorder.traced(&web, &orders, "insert", vec!["cart-7".into()], || Ok(1001));
        let _: Result<(), String> = recorder.traced(&web, &web, "render", vec![], || Ok(()));
        id
    });
    println!("placed order {:?}\n", placed);

    let trace = recorder.trace();
    println!("=== Mermaid ===");
    println!("{}\n", MermaidRenderer::new().render(&trace).unwrap());
    println!("=== PlantUML ===");
    println!("{}", PlantUmlRenderer::new("Checkout").render(&trace).unwrap());
}
