//! 快捷命令：固定字面量（去首尾空白、不区分大小写），绕过决策服务直接处理

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum QuickCommand {
    Help,
    ViewCart,
    ViewWishlist,
    ViewOrders,
    ClearCart,
    ResetHistory,
}

impl QuickCommand {
    pub fn parse(input: &str) -> Option<Self> {
        let cmd = match input.trim().to_lowercase().as_str() {
            "help" | "?" => QuickCommand::Help,
            "cart" | "view cart" | "show cart" => QuickCommand::ViewCart,
            "wishlist" | "view wishlist" | "show wishlist" => QuickCommand::ViewWishlist,
            "orders" | "view orders" | "show orders" | "order history" => QuickCommand::ViewOrders,
            "clear cart" | "empty cart" => QuickCommand::ClearCart,
            "clear history" | "reset" => QuickCommand::ResetHistory,
            _ => return None,
        };
        Some(cmd)
    }
}

pub const HELP_TEXT: &str = "\
Ask in plain language, for example:
  find usb cables under $15
  show me the mechanical keyboard
  add it to my cart / buy it now
  compare P005 and P006
  what would you recommend with P008?

Quick commands:
  help, ?                      show this help
  cart, view cart, show cart   show the cart
  wishlist                     show the wishlist
  orders, order history        show past orders
  clear cart, empty cart       empty the cart
  clear history, reset         forget the conversation";
