use serde::{Deserialize, Serialize};

/// A commented type
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MyType {
    /// This field is a string with a manual comment
    #[serde(rename = "myfield1")]
    pub my_field1: String,

    /// This field is an integer array and also manually commented
    #[serde(rename = "myfield2")]
    pub my_field2: Vec<i64>,

    /// This field is of a custom type
    #[serde(rename = "myfield3")]
    pub my_field3: MySecondType,

    /// This field is an array of the custom type
    #[serde(rename = "myfield4")]
    pub my_field4: Vec<MySecondType>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MySecondType {
    /// This field is inside the second custom type
    #[serde(rename = "mysecondfield1")]
    pub my_second_field1: i32,
}

impl MyType {
    /// Describes the value
    pub fn describe(&self) -> String {
        format!("{} ({} values)", self.my_field1, self.my_field2.len())
    }
}

/// Builds an empty value
pub fn empty() -> MyType {
    MyType {
        my_field1: String::new(),
        my_field2: Vec::new(),
        my_field3: MySecondType { my_second_field1: 0 },
        my_field4: Vec::new(),
    }
}
