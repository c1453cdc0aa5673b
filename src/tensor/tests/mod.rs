/*
 * @Author       : 老董
 * @Date         : 2026-10-16
 * @Description  : 张量模块单元测试
 */
