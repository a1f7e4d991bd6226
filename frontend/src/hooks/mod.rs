pub mod load_state;
pub mod use_shopping_list_detail;
pub mod use_shopping_lists;

#[cfg(test)]
pub(crate) mod test_support;
