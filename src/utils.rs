// 该文件是 Zhijian （质检） 项目的一部分。
// src/utils.rs - URL 辅助函数
//
// 本文件根据 Apache 许可证第 2.0 版（以下简称“许可证”）授权使用；
// 除非遵守该许可证条款，否则您不得使用本文件。
// 您可通过以下网址获取许可证副本：
// http://www.apache.org/licenses/LICENSE-2.0
// 除非适用法律要求或书面同意，根据本许可协议分发的软件均按“原样”提供，
// 不附带任何形式的明示或暗示的保证或条件。
// 有关许可权限与限制的具体条款，请参阅本许可协议。
//
// Copyright (C) 2026 Johann Li <me@qinka.pro>, Wareless Group

use std::path::PathBuf;

use url::Url;

/// 从 URL 中取出本地路径
///
/// `image:///tmp/a.png` 为绝对路径；`folder://output/nok` 中的 host
/// 视为相对路径的第一段。路径中的百分号编码会被解码。
pub fn url_to_path(url: &Url) -> PathBuf {
  let path = urlencoding::decode(url.path())
    .map(|p| p.into_owned())
    .unwrap_or_else(|_| url.path().to_string());

  match url.host_str() {
    Some(host) if !host.is_empty() => {
      let host = urlencoding::decode(host)
        .map(|h| h.into_owned())
        .unwrap_or_else(|_| host.to_string());
      PathBuf::from(format!("{}{}", host, path))
    }
    _ => PathBuf::from(path),
  }
}

/// 查询参数中是否存在某个开关（`?always`、`?watch=true` 均视为开启）
pub fn query_flag(url: &Url, key: &str) -> bool {
  url
    .query_pairs()
    .any(|(k, v)| k == key && v != "false" && v != "0")
}

/// 读取查询参数并解析为指定类型，缺失或解析失败时返回 `None`
pub fn query_value<T: std::str::FromStr>(url: &Url, key: &str) -> Option<T> {
  url
    .query_pairs()
    .find(|(k, _)| k == key)
    .and_then(|(_, v)| v.parse().ok())
}
