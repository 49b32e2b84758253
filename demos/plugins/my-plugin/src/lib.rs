use inkdown_plugins_api::{Command, Hotkey, Modifier, Plugin, PluginContext};
use tracing::info;

#[derive(Debug, Default)]
pub struct MyPlugin;

impl Plugin for MyPlugin {
    fn on_load(&mut self, ctx: &mut dyn PluginContext) {
        info!("MyPlugin has been loaded!");

        ctx.add_command(
            Command::new("say-hello", "Just say hello", || {
                info!("Hello from MyPlugin!");
            })
            .with_hotkey(Hotkey::new([Modifier::Mod, Modifier::Shift], "h")),
        );
    }
}
