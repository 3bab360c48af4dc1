use flowr_core::ShellCommand;

pub const HIDDEN_MENU_CONFIG: &str = "hidden_menu_config";
pub const HIDDEN_MENU_FLOWR: &str = "hidden_menu_flowr";
pub const HIDDEN_MENU_HIDE: &str = "hidden_menu_hide";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HiddenMenuAction {
    ShowConfig,
    ShowFlowr,
    HideMenu,
}

pub fn action_from_menu_id(menu_id: &str) -> Option<HiddenMenuAction> {
    match menu_id {
        HIDDEN_MENU_CONFIG => Some(HiddenMenuAction::ShowConfig),
        HIDDEN_MENU_FLOWR => Some(HiddenMenuAction::ShowFlowr),
        HIDDEN_MENU_HIDE => Some(HiddenMenuAction::HideMenu),
        _ => None,
    }
}

pub fn command_for_action(action: HiddenMenuAction) -> ShellCommand {
    match action {
        HiddenMenuAction::ShowConfig => ShellCommand::EnterConfigMenu,
        HiddenMenuAction::ShowFlowr => ShellCommand::LeaveConfigMenu,
        HiddenMenuAction::HideMenu => ShellCommand::HideMenu,
    }
}
